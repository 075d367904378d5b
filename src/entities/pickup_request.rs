//! Pickup request entity - A customer's request to have waste collected.
//!
//! `status` and `payment_status` are stored as their string forms; the typed
//! views live in `core::status`. `payment_amount` is fixed at creation from the
//! estimated quantity and never recomputed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pickup request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pickup_requests")]
pub struct Model {
    /// Unique identifier for the pickup request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer profile that owns this request
    pub customer_id: i64,
    /// Free-form waste category (e.g. "organic", "plastic")
    pub waste_type: String,
    /// Whether the customer sorted the waste before pickup
    pub is_sorted: bool,
    /// Quantity the customer declared, in kilograms
    pub estimated_quantity_kg: f64,
    /// Quantity staff actually weighed, set during collection
    pub actual_quantity_kg: Option<f64>,
    /// Estimated quantity multiplied by the category rate
    pub payment_amount: f64,
    /// `"unpaid"` or `"paid"`
    pub payment_status: String,
    /// Lifecycle state, see `core::status::PickupStatus`
    pub status: String,
    /// Customer notes, may be empty
    pub notes: String,
    /// When the request was created (server-local time)
    pub created_at: DateTime,
    /// Day staff planned the pickup for
    pub scheduled_date: Option<Date>,
}

/// Defines relationships between PickupRequest and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each request belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// A request is collected at most once
    #[sea_orm(has_one = "super::collection_log::Entity")]
    CollectionLog,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::collection_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
