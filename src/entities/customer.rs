//! Customer entity - Profile of a user who sells waste.
//!
//! The financial counters are cumulative and only move when a completed
//! pickup is settled (see `core::settlement`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer profile database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer profile
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user, one profile per user
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Pickup street address
    pub address: String,
    /// Pickup city
    pub city: String,
    /// Total amount ever credited for settled pickups
    pub total_earnings: f64,
    /// Amount currently owed to the customer
    pub account_balance: f64,
    /// Total kilograms of waste sold through settled pickups
    pub total_waste_sold: f64,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each customer profile belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One customer has many pickup requests
    #[sea_orm(has_many = "super::pickup_request::Entity")]
    PickupRequests,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::pickup_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PickupRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
