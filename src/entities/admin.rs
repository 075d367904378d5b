//! Admin entity - Staff profile. The `role` column is the only authorization key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Admin profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    /// Unique identifier for the admin profile
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user, one profile per user
    #[sea_orm(unique)]
    pub user_id: i64,
    /// One of `"super_admin"`, `"hub_manager"`, `"collection_staff"`, `"processor"`
    pub role: String,
    /// Hub the staff member works from, may be empty
    pub hub_location: String,
    /// Department, may be empty
    pub department: String,
}

/// Defines relationships between Admin and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each admin profile belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Collections credited to this admin
    #[sea_orm(has_many = "super::collection_log::Entity")]
    CollectionLogs,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::collection_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
