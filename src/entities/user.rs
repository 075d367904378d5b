//! User entity - Identity record shared by customer and admin profiles.
//!
//! A user owns credentials and contact details only. Whether the user acts as a
//! customer or as staff is decided by which profile row references it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// Opaque credential produced by the identity collaborator's hasher
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Contact phone number
    pub phone: String,
    /// Given name shown on dashboards
    pub first_name: String,
    /// Family name, may be empty
    pub last_name: String,
    /// Inactive users cannot be resolved to a profile
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime,
}

/// Defines relationships between User and the profile entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user may have one customer profile
    #[sea_orm(has_one = "super::customer::Entity")]
    Customer,
    /// A user may have one admin profile
    #[sea_orm(has_one = "super::admin::Entity")]
    Admin,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
