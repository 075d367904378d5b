//! Waste collection log entity - Append-only record of an executed collection.
//!
//! `waste_type` and `is_sorted` are copied from the pickup request when the row
//! is written and are not kept in sync afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Waste collection log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "waste_collection_logs")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Pickup request that was collected (unique index, see `config::database`)
    pub pickup_request_id: i64,
    /// Calendar day of the collection
    pub collection_date: Date,
    /// Admin profile credited with the collection
    pub collected_by_admin_id: i64,
    /// Snapshot of the request's waste type
    pub waste_type: String,
    /// Snapshot of the request's sorted flag
    pub is_sorted: bool,
    /// Weighed quantity in kilograms
    pub quantity_kg: f64,
    /// Staff notes about sorting quality, may be empty
    pub sorting_notes: String,
}

/// Defines relationships between CollectionLog and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each log belongs to one pickup request
    #[sea_orm(
        belongs_to = "super::pickup_request::Entity",
        from = "Column::PickupRequestId",
        to = "super::pickup_request::Column::Id"
    )]
    PickupRequest,
    /// Each log is credited to one admin
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::CollectedByAdminId",
        to = "super::admin::Column::Id"
    )]
    Admin,
    /// Composting batches fed by this collection
    #[sea_orm(has_many = "super::composting_process::Entity")]
    CompostingProcesses,
}

impl Related<super::pickup_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PickupRequest.def()
    }
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl Related<super::composting_process::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompostingProcesses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
