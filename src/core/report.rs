//! Aggregation engine - Dashboard, collection statistics and customer earnings.
//!
//! Everything here is a read over the ledger and the collection logs, computed
//! fresh on every call. Sums over empty sets are reported as `0.0`; no nullable
//! aggregate leaves this module.

use crate::{
    core::{
        pickup::{OwnerInfo, load_owners},
        status::{PaymentStatus, PickupStatus},
    },
    entities::{CollectionLog, Customer, PickupRequest, collection_log, pickup_request},
    errors::{Error, Result},
};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{Condition, PaginatorTrait, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Number of requests shown in the dashboard's service queue.
pub const PENDING_QUEUE_LEN: u64 = 10;

/// Activity on requests created today.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodayStats {
    /// Requests created today
    pub pickups: u64,
    /// Logged quantity of today's requests that are completed
    pub waste_collected_kg: f64,
    /// Payment amount of today's requests that are paid
    pub revenue: f64,
    /// Today's requests that are scheduled or in transit
    pub pending_pickups: u64,
}

/// All-time totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallStats {
    /// Customer profiles
    pub total_customers: u64,
    /// Pickup requests in any status
    pub total_pickups: u64,
    /// Sum of weighed quantities
    pub total_waste_collected_kg: f64,
    /// Payment amount of completed requests
    pub total_revenue: f64,
}

/// One entry of the service queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingPickup {
    /// Request id
    pub id: i64,
    /// Waste type
    pub waste_type: String,
    /// Sorted flag
    pub is_sorted: bool,
    /// Declared quantity
    pub estimated_quantity_kg: f64,
    /// Current status
    pub status: String,
    /// When the request was created
    pub created_at: NaiveDateTime,
    /// Owner display fields
    pub owner: Option<OwnerInfo>,
}

/// Staff dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Day the `today` block covers
    pub date: NaiveDate,
    /// Today's activity
    pub today: TodayStats,
    /// All-time totals
    pub overall: OverallStats,
    /// Oldest open requests, oldest first
    pub pending_queue: Vec<PendingPickup>,
}

/// Optional inclusive date bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First day included
    pub start: Option<NaiveDate>,
    /// Last day included
    pub end: Option<NaiveDate>,
}

/// Collections on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCollectionStats {
    /// Collection day
    pub date: NaiveDate,
    /// Number of logs
    pub collections: u64,
    /// Total collected quantity
    pub total_kg: f64,
    /// Collected quantity that was sorted
    pub sorted_kg: f64,
    /// Collected quantity that was unsorted
    pub unsorted_kg: f64,
    /// Distinct waste types collected
    pub waste_types: u64,
}

/// A customer's earnings: stored counters next to figures derived from their requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerEarnings {
    /// Customer profile id
    pub customer_id: i64,
    /// Stored cumulative earnings
    pub total_earnings: f64,
    /// Stored balance owed
    pub account_balance: f64,
    /// Stored cumulative kilograms sold
    pub total_waste_sold: f64,
    /// Requests in any status
    pub total_pickups: u64,
    /// Weighed quantity of completed requests
    pub completed_kg: f64,
    /// Payment amount of completed, paid requests
    pub total_paid: f64,
}

fn status_is(pickup: &pickup_request::Model, status: PickupStatus) -> bool {
    pickup.status == status.as_str()
}

/// Sums a pickup column over the rows matching `condition`; `0.0` when nothing matches.
async fn sum_pickup_column<C>(
    db: &C,
    column: pickup_request::Column,
    condition: Condition,
) -> Result<f64>
where
    C: ConnectionTrait,
{
    let total: Option<Option<f64>> = PickupRequest::find()
        .filter(condition)
        .select_only()
        .column_as(column.sum(), "total")
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or(0.0))
}

/// Dashboard for the current server-local day.
pub async fn dashboard_summary(db: &DatabaseConnection) -> Result<DashboardSummary> {
    dashboard_summary_for(db, Local::now().date_naive()).await
}

/// Dashboard with `today` pinned to the given day.
pub async fn dashboard_summary_for(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<DashboardSummary> {
    let start = today.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);

    let todays = PickupRequest::find()
        .filter(pickup_request::Column::CreatedAt.gte(start))
        .filter(pickup_request::Column::CreatedAt.lt(end))
        .find_also_related(CollectionLog)
        .all(db)
        .await?;

    let mut today_stats = TodayStats::default();
    for (pickup, log) in &todays {
        today_stats.pickups += 1;
        if status_is(pickup, PickupStatus::Completed) {
            today_stats.waste_collected_kg += log.as_ref().map_or(0.0, |l| l.quantity_kg);
        }
        if pickup.payment_status == PaymentStatus::Paid.as_str() {
            today_stats.revenue += pickup.payment_amount;
        }
        if status_is(pickup, PickupStatus::Scheduled) || status_is(pickup, PickupStatus::InTransit)
        {
            today_stats.pending_pickups += 1;
        }
    }

    let overall = OverallStats {
        total_customers: Customer::find().count(db).await?,
        total_pickups: PickupRequest::find().count(db).await?,
        total_waste_collected_kg: sum_pickup_column(
            db,
            pickup_request::Column::ActualQuantityKg,
            Condition::all(),
        )
        .await?,
        total_revenue: sum_pickup_column(
            db,
            pickup_request::Column::PaymentAmount,
            Condition::all().add(
                pickup_request::Column::Status.eq(PickupStatus::Completed.as_str()),
            ),
        )
        .await?,
    };

    Ok(DashboardSummary {
        date: today,
        today: today_stats,
        overall,
        pending_queue: pending_queue(db).await?,
    })
}

/// Oldest open requests (requested, scheduled or in transit), oldest first.
pub async fn pending_queue(db: &DatabaseConnection) -> Result<Vec<PendingPickup>> {
    let open = PickupStatus::PENDING.map(PickupStatus::as_str);
    let rows = PickupRequest::find()
        .filter(pickup_request::Column::Status.is_in(open))
        .order_by_asc(pickup_request::Column::CreatedAt)
        .order_by_asc(pickup_request::Column::Id)
        .limit(PENDING_QUEUE_LEN)
        .all(db)
        .await?;

    let owners = load_owners(db, rows.iter().map(|p| p.customer_id)).await?;
    Ok(rows
        .into_iter()
        .map(|p| PendingPickup {
            owner: owners.get(&p.customer_id).cloned(),
            id: p.id,
            waste_type: p.waste_type,
            is_sorted: p.is_sorted,
            estimated_quantity_kg: p.estimated_quantity_kg,
            status: p.status,
            created_at: p.created_at,
        })
        .collect())
}

#[derive(Default)]
struct DayAccumulator {
    collections: u64,
    total_kg: f64,
    sorted_kg: f64,
    unsorted_kg: f64,
    waste_types: HashSet<String>,
}

/// Collection logs grouped by day within an inclusive range, newest day first.
pub async fn collection_stats(
    db: &DatabaseConnection,
    range: DateRange,
) -> Result<Vec<DailyCollectionStats>> {
    let mut query = CollectionLog::find();
    if let Some(start) = range.start {
        query = query.filter(collection_log::Column::CollectionDate.gte(start));
    }
    if let Some(end) = range.end {
        query = query.filter(collection_log::Column::CollectionDate.lte(end));
    }
    let logs = query.all(db).await?;

    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for log in logs {
        let day = days.entry(log.collection_date).or_default();
        day.collections += 1;
        day.total_kg += log.quantity_kg;
        if log.is_sorted {
            day.sorted_kg += log.quantity_kg;
        } else {
            day.unsorted_kg += log.quantity_kg;
        }
        day.waste_types.insert(log.waste_type);
    }

    Ok(days
        .into_iter()
        .rev()
        .map(|(date, day)| DailyCollectionStats {
            date,
            collections: day.collections,
            total_kg: day.total_kg,
            sorted_kg: day.sorted_kg,
            unsorted_kg: day.unsorted_kg,
            waste_types: day.waste_types.len() as u64,
        })
        .collect())
}

/// Earnings for one customer.
pub async fn customer_earnings(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<CustomerEarnings> {
    let customer = Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Customer profile", customer_id))?;

    let pickups = PickupRequest::find()
        .filter(pickup_request::Column::CustomerId.eq(customer_id))
        .all(db)
        .await?;

    let mut earnings = CustomerEarnings {
        customer_id,
        total_earnings: customer.total_earnings,
        account_balance: customer.account_balance,
        total_waste_sold: customer.total_waste_sold,
        total_pickups: 0,
        completed_kg: 0.0,
        total_paid: 0.0,
    };
    for pickup in &pickups {
        earnings.total_pickups += 1;
        if status_is(pickup, PickupStatus::Completed) {
            earnings.completed_kg += pickup.actual_quantity_kg.unwrap_or(0.0);
            if pickup.payment_status == PaymentStatus::Paid.as_str() {
                earnings.total_paid += pickup.payment_amount;
            }
        }
    }
    Ok(earnings)
}
