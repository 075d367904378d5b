//! Pickup request ledger - Owns the lifecycle of a pickup request.
//!
//! Customers create, list, inspect and cancel their own requests. Staff list all
//! requests and drive status changes. Marking a request `collected` with a
//! weighed quantity hands off to [`crate::core::collection`] inside the same
//! database transaction.
//!
//! Every state change is written as a conditional `UPDATE … WHERE <expected state>`
//! so two racing callers cannot both succeed.

use crate::{
    config::settings::ListingConfig,
    core::{
        collection, identity,
        pricing::{self, PaymentQuote},
        status::{Capability, PaymentStatus, PickupStatus},
    },
    entities::{
        CollectionLog, Customer, PickupRequest, User, collection_log, customer, pickup_request,
        user,
    },
    errors::{Error, Result},
};
use chrono::{Local, NaiveDate};
use sea_orm::{
    Condition, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const PICKUP: &str = "Pickup request";

/// Result of [`create_request`]: the stored row plus the price breakdown shown to the customer.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPickup {
    /// Persisted request
    pub pickup: pickup_request::Model,
    /// Rate and total used for `payment_amount`
    pub quote: PaymentQuote,
}

/// Collection facts attached to a request once it has been collected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    /// Day of collection
    pub collection_date: NaiveDate,
    /// Weighed quantity logged at collection
    pub final_quantity_kg: f64,
    /// Admin credited with the collection
    pub collected_by_admin_id: i64,
    /// Staff sorting notes
    pub sorting_notes: String,
}

impl From<collection_log::Model> for CollectionSummary {
    fn from(log: collection_log::Model) -> Self {
        Self {
            collection_date: log.collection_date,
            final_quantity_kg: log.quantity_kg,
            collected_by_admin_id: log.collected_by_admin_id,
            sorting_notes: log.sorting_notes,
        }
    }
}

/// A customer's view of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupDetail {
    /// The request itself
    pub pickup: pickup_request::Model,
    /// Present only after the request was collected
    pub collection: Option<CollectionSummary>,
}

/// Optional equality filters for the staff listing.
#[derive(Debug, Clone, Default)]
pub struct PickupFilter {
    /// Only requests in this status
    pub status: Option<PickupStatus>,
    /// Only requests of this waste type
    pub waste_type: Option<String>,
}

impl PickupFilter {
    /// Translates the filter into parameterised predicates.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(status) = self.status {
            condition = condition.add(pickup_request::Column::Status.eq(status.as_str()));
        }
        if let Some(waste_type) = &self.waste_type {
            condition = condition.add(pickup_request::Column::WasteType.eq(waste_type.as_str()));
        }
        condition
    }
}

/// Pagination block returned next to a page of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Rows matching the filter across all pages
    pub total: u64,
    /// One-based page number served
    pub page: u64,
    /// Page size served
    pub limit: u64,
    /// `ceil(total / limit)`
    pub pages: u64,
}

/// Customer and user fields shown next to a request in staff views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerInfo {
    /// Customer's given name
    pub first_name: String,
    /// Customer's login email
    pub email: String,
    /// Pickup address
    pub address: String,
    /// Pickup city
    pub city: String,
}

/// One row of the staff listing.
#[derive(Debug, Clone, Serialize)]
pub struct AdminPickupRow {
    /// The request
    pub pickup: pickup_request::Model,
    /// Who owns it; `None` only if the profile was removed out of band
    pub owner: Option<OwnerInfo>,
}

/// A page of the staff listing.
#[derive(Debug, Clone, Serialize)]
pub struct AdminPickupPage {
    /// Requests on this page, newest first
    pub pickups: Vec<AdminPickupRow>,
    /// Totals for paging controls
    pub pagination: Pagination,
}

/// A staff status change.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    /// Target status; must be admin-settable
    pub status: PickupStatus,
    /// Weighed quantity, stored on the request when present
    pub actual_quantity_kg: Option<f64>,
    /// Sorting notes recorded on the collection log
    pub notes: Option<String>,
}

/// Creates a pickup request for a customer.
///
/// The quantity must meet the category minimum; the payment amount is fixed here
/// from the category rate. Nothing is written when validation fails.
#[instrument(skip(db, notes))]
pub async fn create_request(
    db: &DatabaseConnection,
    customer_id: i64,
    waste_type: &str,
    is_sorted: bool,
    estimated_quantity_kg: f64,
    notes: Option<String>,
) -> Result<CreatedPickup> {
    let quote = pricing::quote(waste_type, is_sorted, estimated_quantity_kg)?;

    Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Customer profile", customer_id))?;

    let pickup = pickup_request::ActiveModel {
        customer_id: Set(customer_id),
        waste_type: Set(quote.waste_type.clone()),
        is_sorted: Set(is_sorted),
        estimated_quantity_kg: Set(estimated_quantity_kg),
        actual_quantity_kg: Set(None),
        payment_amount: Set(quote.total_amount),
        payment_status: Set(PaymentStatus::Unpaid.as_str().to_string()),
        status: Set(PickupStatus::Requested.as_str().to_string()),
        notes: Set(notes.unwrap_or_default()),
        created_at: Set(Local::now().naive_local()),
        scheduled_date: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(pickup_id = pickup.id, amount = quote.total_amount, "pickup requested");
    Ok(CreatedPickup { pickup, quote })
}

/// Lists a customer's requests, newest first. Unbounded.
pub async fn list_for_customer(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Vec<pickup_request::Model>> {
    PickupRequest::find()
        .filter(pickup_request::Column::CustomerId.eq(customer_id))
        .order_by_desc(pickup_request::Column::CreatedAt)
        .order_by_desc(pickup_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches one of the customer's requests together with its collection log, if any.
///
/// Requests owned by another customer are reported as not found.
pub async fn get_detail(
    db: &DatabaseConnection,
    request_id: i64,
    customer_id: i64,
) -> Result<PickupDetail> {
    let (pickup, log) = PickupRequest::find_by_id(request_id)
        .filter(pickup_request::Column::CustomerId.eq(customer_id))
        .find_also_related(CollectionLog)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(PICKUP, request_id))?;

    Ok(PickupDetail {
        pickup,
        collection: log.map(CollectionSummary::from),
    })
}

/// Cancels one of the customer's requests. Only legal from `requested` or `scheduled`.
#[instrument(skip(db))]
pub async fn cancel(db: &DatabaseConnection, request_id: i64, customer_id: i64) -> Result<()> {
    let cancellable = PickupStatus::CUSTOMER_CANCELLABLE.map(PickupStatus::as_str);

    let result = PickupRequest::update_many()
        .col_expr(
            pickup_request::Column::Status,
            Expr::value(PickupStatus::Cancelled.as_str()),
        )
        .filter(pickup_request::Column::Id.eq(request_id))
        .filter(pickup_request::Column::CustomerId.eq(customer_id))
        .filter(pickup_request::Column::Status.is_in(cancellable))
        .exec(db)
        .await?;

    if result.rows_affected == 1 {
        info!("pickup cancelled");
        return Ok(());
    }

    // Nothing matched: work out whether the request is missing or in the wrong state.
    let pickup = PickupRequest::find_by_id(request_id)
        .filter(pickup_request::Column::CustomerId.eq(customer_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(PICKUP, request_id))?;

    Err(Error::invalid_state(format!(
        "Cannot cancel pickup in status {}",
        pickup.status
    )))
}

/// Pages through all requests for staff, newest first, with owner display fields.
///
/// `page` is one-based. `limit` must be at least 1 and no larger than the
/// configured maximum page size.
pub async fn list_for_admin(
    db: &DatabaseConnection,
    filter: &PickupFilter,
    page: u64,
    limit: u64,
    listing: &ListingConfig,
) -> Result<AdminPickupPage> {
    if page == 0 {
        return Err(Error::validation("Page must be at least 1"));
    }
    if limit == 0 || limit > listing.max_page_size {
        return Err(Error::validation(format!(
            "Limit must be between 1 and {}",
            listing.max_page_size
        )));
    }

    let paginator = PickupRequest::find()
        .filter(filter.condition())
        .order_by_desc(pickup_request::Column::CreatedAt)
        .order_by_desc(pickup_request::Column::Id)
        .paginate(db, limit);

    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(page - 1).await?;
    debug!(total, served = rows.len(), "admin pickup page");

    let owners = load_owners(db, rows.iter().map(|p| p.customer_id)).await?;
    let pickups = rows
        .into_iter()
        .map(|pickup| AdminPickupRow {
            owner: owners.get(&pickup.customer_id).cloned(),
            pickup,
        })
        .collect();

    Ok(AdminPickupPage {
        pickups,
        pagination: Pagination {
            total,
            page,
            limit,
            pages: total.div_ceil(limit),
        },
    })
}

/// Loads owner display fields for a set of customer ids in one query.
pub(crate) async fn load_owners<C>(
    db: &C,
    customer_ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, OwnerInfo>>
where
    C: ConnectionTrait,
{
    let mut ids: Vec<i64> = customer_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let owners = Customer::find()
        .filter(customer::Column::Id.is_in(ids))
        .find_also_related(User)
        .all(db)
        .await?;

    Ok(owners
        .into_iter()
        .filter_map(|(customer, user)| {
            user.map(|user: user::Model| {
                (
                    customer.id,
                    OwnerInfo {
                        first_name: user.first_name,
                        email: user.email,
                        address: customer.address,
                        city: customer.city,
                    },
                )
            })
        })
        .collect())
}

fn validate_actual_quantity(quantity_kg: Option<f64>) -> Result<()> {
    match quantity_kg {
        Some(q) if !q.is_finite() || q <= 0.0 => {
            Err(Error::validation(format!("Invalid actual quantity: {q}")))
        }
        _ => Ok(()),
    }
}

/// Applies a staff status change.
///
/// The caller must hold [`Capability::ManagePickups`]. The new status is applied
/// from any prior state except `cancelled`, which is terminal, and except once the
/// pickup is paid: settled pickups are frozen so the customer's counters keep
/// matching the ledger. When present, the weighed quantity overwrites
/// `actual_quantity_kg`. Moving to `collected` with a quantity writes the
/// collection log; this happens at most once per request and a second attempt
/// fails with `InvalidState` without changing anything.
#[instrument(skip(db, update), fields(status = %update.status))]
pub async fn update_status(
    db: &DatabaseConnection,
    request_id: i64,
    update: StatusUpdate,
    admin_user_id: i64,
) -> Result<pickup_request::Model> {
    if !update.status.is_admin_settable() {
        return Err(Error::validation(format!("Invalid status: {}", update.status)));
    }
    validate_actual_quantity(update.actual_quantity_kg)?;

    let txn = db.begin().await?;

    let admin = identity::authorize(&txn, admin_user_id, Capability::ManagePickups).await?;

    let pickup = PickupRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found(PICKUP, request_id))?;
    if pickup.status == PickupStatus::Cancelled.as_str() {
        return Err(Error::invalid_state(format!(
            "Pickup request {request_id} is cancelled"
        )));
    }
    if pickup.payment_status.parse::<PaymentStatus>()? == PaymentStatus::Paid {
        return Err(Error::invalid_state(format!(
            "Pickup request {request_id} is already settled"
        )));
    }

    let collected_quantity = match (update.status, update.actual_quantity_kg) {
        (PickupStatus::Collected, Some(quantity)) => Some(quantity),
        _ => None,
    };

    let mut change = PickupRequest::update_many()
        .col_expr(
            pickup_request::Column::Status,
            Expr::value(update.status.as_str()),
        )
        .filter(pickup_request::Column::Id.eq(request_id))
        .filter(pickup_request::Column::Status.ne(PickupStatus::Cancelled.as_str()))
        .filter(pickup_request::Column::PaymentStatus.eq(PaymentStatus::Unpaid.as_str()));
    if let Some(quantity) = update.actual_quantity_kg {
        change = change.col_expr(pickup_request::Column::ActualQuantityKg, Expr::value(quantity));
    }

    if change.exec(&txn).await?.rows_affected != 1 {
        return Err(Error::invalid_state(format!(
            "Pickup request {request_id} was cancelled or settled concurrently"
        )));
    }

    if let Some(quantity) = collected_quantity {
        collection::record(&txn, request_id, admin.id, quantity, update.notes).await?;
    }

    let updated = PickupRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found(PICKUP, request_id))?;

    txn.commit().await?;

    info!(admin_id = admin.id, from = %pickup.status, "pickup status updated");
    Ok(updated)
}

/// Plans a `requested` pickup for a date and moves it to `scheduled`.
#[instrument(skip(db))]
pub async fn schedule(
    db: &DatabaseConnection,
    request_id: i64,
    date: NaiveDate,
    admin_user_id: i64,
) -> Result<pickup_request::Model> {
    let txn = db.begin().await?;
    identity::authorize(&txn, admin_user_id, Capability::ManagePickups).await?;

    let result = PickupRequest::update_many()
        .col_expr(
            pickup_request::Column::Status,
            Expr::value(PickupStatus::Scheduled.as_str()),
        )
        .col_expr(pickup_request::Column::ScheduledDate, Expr::value(date))
        .filter(pickup_request::Column::Id.eq(request_id))
        .filter(pickup_request::Column::Status.eq(PickupStatus::Requested.as_str()))
        .exec(&txn)
        .await?;

    let pickup = PickupRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found(PICKUP, request_id))?;

    if result.rows_affected != 1 {
        return Err(Error::invalid_state(format!(
            "Cannot schedule pickup in status {}",
            pickup.status
        )));
    }

    txn.commit().await?;
    Ok(pickup)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{report, settlement, status::AdminRole};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_sorted_request_is_priced_and_requested() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;

        let created = create_request(
            &db,
            customer.customer.id,
            "organic",
            true,
            200.0,
            Some("Back gate".to_string()),
        )
        .await?;

        assert_eq!(created.pickup.payment_amount, 400.0);
        assert_eq!(created.pickup.status, "requested");
        assert_eq!(created.pickup.payment_status, "unpaid");
        assert_eq!(created.pickup.actual_quantity_kg, None);
        assert_eq!(created.pickup.notes, "Back gate");
        assert_eq!(created.quote.rate_label, "2tk/kg");
        assert_eq!(created.quote.total_amount, 400.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_below_minimum_is_rejected_and_not_persisted() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;

        let err = create_request(&db, customer.customer.id, "mixed", false, 80.0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("100kg"));

        let err = create_request(&db, customer.customer.id, "organic", true, 49.0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        assert_eq!(PickupRequest::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_for_unknown_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_request(&db, 42, "organic", true, 60.0, None).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_for_customer_newest_first_and_scoped() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let other = create_test_customer(&db, "other@example.com").await?;

        let first = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;
        let second = create_test_pickup(&db, customer.customer.id, false, 150.0).await?;
        create_test_pickup(&db, other.customer.id, true, 70.0).await?;
        backdate_pickup(&db, first.pickup.id, days_ago(2)).await?;

        let listed = list_for_customer(&db, customer.customer.id).await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.pickup.id);
        assert_eq!(listed[1].id, first.pickup.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_detail_without_log_and_idempotent() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let created = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;

        let first = get_detail(&db, created.pickup.id, customer.customer.id).await?;
        let second = get_detail(&db, created.pickup.id, customer.customer.id).await?;
        assert_eq!(first, second);
        assert!(first.collection.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_detail_not_owned_is_not_found() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let other = create_test_customer(&db, "other@example.com").await?;
        let created = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;

        let result = get_detail(&db, created.pickup.id, other.customer.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        let result = get_detail(&db, 999, customer.customer.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_from_requested_and_scheduled() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::CollectionStaff).await?;

        let requested = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;
        cancel(&db, requested.pickup.id, customer.customer.id).await?;
        let detail = get_detail(&db, requested.pickup.id, customer.customer.id).await?;
        assert_eq!(detail.pickup.status, "cancelled");

        let scheduled = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;
        set_status(&db, scheduled.pickup.id, PickupStatus::Scheduled, staff.user.id).await?;
        cancel(&db, scheduled.pickup.id, customer.customer.id).await?;
        let detail = get_detail(&db, scheduled.pickup.id, customer.customer.id).await?;
        assert_eq!(detail.pickup.status, "cancelled");
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_rejected_from_other_states() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::CollectionStaff).await?;

        for status in [
            PickupStatus::InTransit,
            PickupStatus::Collected,
            PickupStatus::Completed,
            PickupStatus::Cancelled,
        ] {
            let created = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;
            set_status(&db, created.pickup.id, status, staff.user.id).await?;

            let result = cancel(&db, created.pickup.id, customer.customer.id).await;
            assert!(
                matches!(result, Err(Error::InvalidState { .. })),
                "status {status}"
            );
            let detail = get_detail(&db, created.pickup.id, customer.customer.id).await?;
            assert_eq!(detail.pickup.status, status.as_str());
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_not_owned_is_not_found() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let other = create_test_customer(&db, "other@example.com").await?;
        let created = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;

        let result = cancel(&db, created.pickup.id, other.customer.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        let detail = get_detail(&db, created.pickup.id, customer.customer.id).await?;
        assert_eq!(detail.pickup.status, "requested");
        Ok(())
    }

    #[tokio::test]
    async fn test_collected_scenario_writes_one_log() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::CollectionStaff).await?;
        let created = create_request(&db, customer.customer.id, "organic", true, 200.0, None).await?;
        assert_eq!(created.pickup.payment_amount, 400.0);

        let updated = update_status(
            &db,
            created.pickup.id,
            StatusUpdate {
                status: PickupStatus::Collected,
                actual_quantity_kg: Some(180.0),
                notes: Some("Clean".to_string()),
            },
            staff.user.id,
        )
        .await?;
        assert_eq!(updated.status, "collected");
        assert_eq!(updated.actual_quantity_kg, Some(180.0));

        let logs = CollectionLog::find().all(&db).await?;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].quantity_kg, 180.0);
        assert!(logs[0].is_sorted);
        assert_eq!(logs[0].waste_type, "organic");
        assert_eq!(logs[0].collected_by_admin_id, staff.admin.id);
        assert_eq!(logs[0].sorting_notes, "Clean");
        assert_eq!(logs[0].collection_date, Local::now().date_naive());

        let detail = get_detail(&db, created.pickup.id, customer.customer.id).await?;
        let collection = detail.collection.unwrap();
        assert_eq!(collection.final_quantity_kg, 180.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_collection_is_rejected() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::HubManager).await?;
        let created = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;

        let collect = StatusUpdate {
            status: PickupStatus::Collected,
            actual_quantity_kg: Some(58.0),
            notes: None,
        };
        update_status(&db, created.pickup.id, collect.clone(), staff.user.id).await?;
        let result = update_status(&db, created.pickup.id, collect.clone(), staff.user.id).await;
        assert!(matches!(result, Err(Error::InvalidState { .. })));

        // Stepping back and collecting again still cannot duplicate the log
        set_status(&db, created.pickup.id, PickupStatus::InTransit, staff.user.id).await?;
        let result = update_status(&db, created.pickup.id, collect, staff.user.id).await;
        assert!(matches!(result, Err(Error::InvalidState { .. })));

        assert_eq!(CollectionLog::find().count(&db).await?, 1);
        let pickup = PickupRequest::find_by_id(created.pickup.id).one(&db).await?.unwrap();
        assert_eq!(pickup.status, "in_transit");
        Ok(())
    }

    #[tokio::test]
    async fn test_collected_without_quantity_writes_no_log() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::SuperAdmin).await?;
        let created = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;

        let updated =
            set_status(&db, created.pickup.id, PickupStatus::Collected, staff.user.id).await?;
        assert_eq!(updated.status, "collected");
        assert_eq!(updated.actual_quantity_kg, None);
        assert_eq!(CollectionLog::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_authorization_and_validation() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let processor = create_test_admin(&db, "proc@example.com", AdminRole::Processor).await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::CollectionStaff).await?;
        let created = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;

        let result = set_status(&db, created.pickup.id, PickupStatus::Requested, staff.user.id).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result =
            set_status(&db, created.pickup.id, PickupStatus::Scheduled, customer.user.id).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        let result =
            set_status(&db, created.pickup.id, PickupStatus::Scheduled, processor.user.id).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        let result = set_status(&db, 999, PickupStatus::Scheduled, staff.user.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        let result = update_status(
            &db,
            created.pickup.id,
            StatusUpdate {
                status: PickupStatus::Collected,
                actual_quantity_kg: Some(-3.0),
                notes: None,
            },
            staff.user.id,
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let pickup = PickupRequest::find_by_id(created.pickup.id).one(&db).await?.unwrap();
        assert_eq!(pickup.status, "requested");
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_is_terminal_for_staff() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::HubManager).await?;
        let created = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;
        cancel(&db, created.pickup.id, customer.customer.id).await?;

        let result = set_status(&db, created.pickup.id, PickupStatus::Scheduled, staff.user.id).await;
        assert!(matches!(result, Err(Error::InvalidState { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_settled_pickup_is_frozen_for_staff() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::HubManager).await?;
        let created = create_test_pickup(&db, customer.customer.id, true, 100.0).await?;
        complete_pickup(&db, created.pickup.id, 90.0, staff.user.id).await?;
        settlement::settle_payment(&db, created.pickup.id, staff.user.id).await?;

        let result = update_status(
            &db,
            created.pickup.id,
            StatusUpdate {
                status: PickupStatus::Cancelled,
                actual_quantity_kg: Some(5.0),
                notes: None,
            },
            staff.user.id,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidState { .. })));

        let result = set_status(&db, created.pickup.id, PickupStatus::InTransit, staff.user.id).await;
        assert!(matches!(result, Err(Error::InvalidState { .. })));

        // Ledger and counters still agree
        let pickup = PickupRequest::find_by_id(created.pickup.id).one(&db).await?.unwrap();
        assert_eq!(pickup.status, "completed");
        assert_eq!(pickup.payment_status, "paid");
        assert_eq!(pickup.actual_quantity_kg, Some(90.0));

        let earnings = report::customer_earnings(&db, customer.customer.id).await?;
        assert_eq!(earnings.total_earnings, 200.0);
        assert_eq!(earnings.total_paid, 200.0);
        assert_eq!(earnings.total_waste_sold, 90.0);
        assert_eq!(earnings.completed_kg, 90.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_weight_can_follow_a_bare_collected_update() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::CollectionStaff).await?;
        let created = create_test_pickup(&db, customer.customer.id, false, 120.0).await?;

        set_status(&db, created.pickup.id, PickupStatus::Collected, staff.user.id).await?;
        assert_eq!(CollectionLog::find().count(&db).await?, 0);

        let updated = update_status(
            &db,
            created.pickup.id,
            StatusUpdate {
                status: PickupStatus::Collected,
                actual_quantity_kg: Some(115.0),
                notes: Some("wet".to_string()),
            },
            staff.user.id,
        )
        .await?;
        assert_eq!(updated.status, "collected");
        assert_eq!(updated.actual_quantity_kg, Some(115.0));

        let log = collection::get_log_for_pickup(&db, created.pickup.id).await?.unwrap();
        assert_eq!(log.quantity_kg, 115.0);
        assert_eq!(log.collected_by_admin_id, staff.admin.id);
        assert_eq!(CollectionLog::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_for_admin_paginates_with_filter() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::HubManager).await?;

        for _ in 0..25 {
            create_test_pickup(&db, customer.customer.id, true, 60.0).await?;
        }
        let scheduled = create_test_pickup(&db, customer.customer.id, true, 60.0).await?;
        set_status(&db, scheduled.pickup.id, PickupStatus::Scheduled, staff.user.id).await?;

        let filter = PickupFilter {
            status: Some(PickupStatus::Requested),
            waste_type: None,
        };
        let listing = ListingConfig::default();

        let page1 = list_for_admin(&db, &filter, 1, 20, &listing).await?;
        assert_eq!(page1.pickups.len(), 20);
        assert_eq!(page1.pagination.total, 25);
        assert_eq!(page1.pagination.pages, 2);
        assert_eq!(page1.pagination.page, 1);
        assert_eq!(page1.pagination.limit, 20);
        assert!(page1.pickups.iter().all(|row| row.pickup.status == "requested"));
        let owner = page1.pickups[0].owner.as_ref().unwrap();
        assert_eq!(owner.email, customer.user.email);
        assert_eq!(owner.city, "Dhaka");

        let page2 = list_for_admin(&db, &filter, 2, 20, &listing).await?;
        assert_eq!(page2.pickups.len(), 5);

        // Newest first across pages
        assert!(page1.pickups[19].pickup.id > page2.pickups[0].pickup.id);

        let unfiltered = list_for_admin(&db, &PickupFilter::default(), 1, 100, &listing).await?;
        assert_eq!(unfiltered.pagination.total, 26);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_for_admin_filters_by_waste_type() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        create_request(&db, customer.customer.id, "plastic", true, 60.0, None).await?;
        create_request(&db, customer.customer.id, "organic", true, 60.0, None).await?;

        let filter = PickupFilter {
            status: None,
            waste_type: Some("plastic".to_string()),
        };
        let page = list_for_admin(&db, &filter, 1, 10, &ListingConfig::default()).await?;
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.pickups[0].pickup.waste_type, "plastic");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_for_admin_rejects_bad_paging() -> Result<()> {
        let db = setup_test_db().await?;
        let listing = ListingConfig { max_page_size: 50 };
        let filter = PickupFilter::default();

        assert!(list_for_admin(&db, &filter, 0, 20, &listing).await.is_err());
        assert!(list_for_admin(&db, &filter, 1, 0, &listing).await.is_err());
        assert!(list_for_admin(&db, &filter, 1, 51, &listing).await.is_err());

        let empty = list_for_admin(&db, &filter, 1, 50, &listing).await?;
        assert_eq!(empty.pagination.total, 0);
        assert_eq!(empty.pagination.pages, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_schedule_sets_date_from_requested_only() -> Result<()> {
        let (db, customer) = setup_with_customer().await?;
        let staff = create_test_admin(&db, "staff@example.com", AdminRole::CollectionStaff).await?;
        let created = create_test_pickup(&db, customer.customer.id, false, 120.0).await?;
        let date = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();

        let scheduled = schedule(&db, created.pickup.id, date, staff.user.id).await?;
        assert_eq!(scheduled.status, "scheduled");
        assert_eq!(scheduled.scheduled_date, Some(date));

        let result = schedule(&db, created.pickup.id, date, staff.user.id).await;
        assert!(matches!(result, Err(Error::InvalidState { .. })));
        let result = schedule(&db, 999, date, staff.user.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }
}
