//! Composting process entity - Downstream batch converting collected waste to compost.
//!
//! Owned by the processing side; the ledger only reads it for dashboards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Composting process database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "composting_processes")]
pub struct Model {
    /// Unique identifier for the batch
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-facing batch label
    #[sea_orm(unique)]
    pub batch_number: String,
    /// Collection that fed this batch, if recorded
    pub waste_collection_log_id: Option<i64>,
    /// Processing state as reported by the processor (free-form)
    pub status: String,
    /// Day processing began
    pub process_start_date: Date,
    /// Planned completion day
    pub estimated_completion_date: Option<Date>,
    /// Actual completion day
    pub actual_completion_date: Option<Date>,
    /// Input quantity in kilograms
    pub initial_quantity_kg: f64,
    /// Output compost in kilograms
    pub final_quantity_kg: Option<f64>,
    /// Grade assigned to the finished compost
    pub compost_grade: Option<String>,
}

/// Defines relationships between CompostingProcess and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each batch may reference one collection log
    #[sea_orm(
        belongs_to = "super::collection_log::Entity",
        from = "Column::WasteCollectionLogId",
        to = "super::collection_log::Column::Id"
    )]
    CollectionLog,
}

impl Related<super::collection_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
