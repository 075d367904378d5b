//! Composting projection - Read-only dashboard view of composting batches.

use crate::{
    entities::{CollectionLog, CompostingProcess, PickupRequest, composting_process, pickup_request},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// One composting batch with the context of the collection that fed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompostingRow {
    /// Batch id
    pub id: i64,
    /// Batch label
    pub batch_number: String,
    /// Processing state
    pub status: String,
    /// Day processing began
    pub process_start_date: NaiveDate,
    /// Planned completion day
    pub estimated_completion_date: Option<NaiveDate>,
    /// Actual completion day
    pub actual_completion_date: Option<NaiveDate>,
    /// Input quantity
    pub initial_quantity_kg: f64,
    /// Output quantity
    pub final_quantity_kg: Option<f64>,
    /// Compost grade
    pub compost_grade: Option<String>,
    /// Waste type of the feeding collection, if linked
    pub waste_type: Option<String>,
    /// Customer profile whose waste fed the batch, if linked
    pub customer_id: Option<i64>,
}

/// Lists every composting batch, most recently started first.
///
/// Batches without a linked collection, or whose collection's request is gone,
/// are still listed with the missing context left empty.
pub async fn composting_overview(db: &DatabaseConnection) -> Result<Vec<CompostingRow>> {
    let batches = CompostingProcess::find()
        .order_by_desc(composting_process::Column::ProcessStartDate)
        .order_by_desc(composting_process::Column::Id)
        .find_also_related(CollectionLog)
        .all(db)
        .await?;

    let request_ids: Vec<i64> = batches
        .iter()
        .filter_map(|(_, log)| log.as_ref().map(|l| l.pickup_request_id))
        .collect();
    let owners: HashMap<i64, i64> = if request_ids.is_empty() {
        HashMap::new()
    } else {
        PickupRequest::find()
            .filter(pickup_request::Column::Id.is_in(request_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.customer_id))
            .collect()
    };

    Ok(batches
        .into_iter()
        .map(|(batch, log)| {
            let customer_id = log
                .as_ref()
                .and_then(|l| owners.get(&l.pickup_request_id).copied());
            CompostingRow {
                id: batch.id,
                batch_number: batch.batch_number,
                status: batch.status,
                process_start_date: batch.process_start_date,
                estimated_completion_date: batch.estimated_completion_date,
                actual_completion_date: batch.actual_completion_date,
                initial_quantity_kg: batch.initial_quantity_kg,
                final_quantity_kg: batch.final_quantity_kg,
                compost_grade: batch.compost_grade,
                waste_type: log.map(|l| l.waste_type),
                customer_id,
            }
        })
        .collect())
}
