//! Collection recorder - Writes the immutable log entry for an executed collection.
//!
//! Logs are append-only. A request is collected at most once: [`record`] refuses
//! to write a second log for the same request, and the database backs this with
//! a unique index on `pickup_request_id`.

use crate::{
    entities::{CollectionLog, PickupRequest, collection_log},
    errors::{Error, Result},
};
use chrono::Local;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Records a collection against a pickup request, dated today.
///
/// Copies the request's waste type and sorted flag onto the log and credits
/// `collecting_admin_id`. Meant to run inside the caller's transaction so the
/// log and the status change commit together.
#[instrument(skip(db, notes))]
pub async fn record<C>(
    db: &C,
    request_id: i64,
    collecting_admin_id: i64,
    quantity_kg: f64,
    notes: Option<String>,
) -> Result<collection_log::Model>
where
    C: ConnectionTrait,
{
    if !quantity_kg.is_finite() || quantity_kg <= 0.0 {
        return Err(Error::validation(format!(
            "Invalid collected quantity: {quantity_kg}"
        )));
    }

    let pickup = PickupRequest::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Pickup request", request_id))?;

    if get_log_for_pickup(db, request_id).await?.is_some() {
        return Err(Error::invalid_state(format!(
            "Pickup request {request_id} has already been collected"
        )));
    }

    let log = collection_log::ActiveModel {
        pickup_request_id: Set(request_id),
        collection_date: Set(Local::now().date_naive()),
        collected_by_admin_id: Set(collecting_admin_id),
        waste_type: Set(pickup.waste_type),
        is_sorted: Set(pickup.is_sorted),
        quantity_kg: Set(quantity_kg),
        sorting_notes: Set(notes.unwrap_or_default()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(log_id = log.id, "collection logged");
    Ok(log)
}

/// Returns the collection log for a request, if it has been collected.
pub async fn get_log_for_pickup<C>(
    db: &C,
    request_id: i64,
) -> Result<Option<collection_log::Model>>
where
    C: ConnectionTrait,
{
    CollectionLog::find()
        .filter(collection_log::Column::PickupRequestId.eq(request_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every log credited to an admin, most recent collection first.
pub async fn list_for_admin(
    db: &DatabaseConnection,
    admin_id: i64,
) -> Result<Vec<collection_log::Model>> {
    CollectionLog::find()
        .filter(collection_log::Column::CollectedByAdminId.eq(admin_id))
        .order_by_desc(collection_log::Column::CollectionDate)
        .order_by_desc(collection_log::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
