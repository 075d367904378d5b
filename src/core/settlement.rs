//! Payment settlement - Pays a customer for a completed pickup.
//!
//! Settlement is the only place the customer's cumulative counters move. It is
//! idempotent: the payment flag flips from `unpaid` to `paid` with a conditional
//! update, and the counters are incremented in the same transaction only when
//! that flip happened.

use crate::{
    core::{
        identity,
        status::{Capability, PaymentStatus, PickupStatus},
    },
    entities::{Customer, PickupRequest, customer, pickup_request},
    errors::{Error, Result},
};
use sea_orm::{TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

/// What [`settle_payment`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    /// The pickup was marked paid and the customer credited
    Settled {
        /// Pickup after settlement
        pickup: pickup_request::Model,
        /// Customer profile after crediting
        customer: customer::Model,
    },
    /// The pickup had been paid before; nothing changed
    AlreadySettled {
        /// Pickup as stored
        pickup: pickup_request::Model,
    },
}

/// Marks a completed pickup as paid and posts it to the customer's counters.
///
/// Credits `payment_amount` to `total_earnings` and `account_balance`, and the
/// weighed quantity to `total_waste_sold`. Requires [`Capability::SettlePayments`].
#[instrument(skip(db))]
pub async fn settle_payment(
    db: &DatabaseConnection,
    request_id: i64,
    admin_user_id: i64,
) -> Result<SettlementOutcome> {
    let txn = db.begin().await?;
    let admin = identity::authorize(&txn, admin_user_id, Capability::SettlePayments).await?;

    let pickup = PickupRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Pickup request", request_id))?;

    if pickup.payment_status.parse::<PaymentStatus>()? == PaymentStatus::Paid {
        return Ok(SettlementOutcome::AlreadySettled { pickup });
    }
    if pickup.status != PickupStatus::Completed.as_str() {
        return Err(Error::invalid_state(format!(
            "Only completed pickups can be settled, pickup {request_id} is {}",
            pickup.status
        )));
    }
    let quantity = pickup.actual_quantity_kg.ok_or_else(|| {
        Error::invalid_state(format!("Pickup {request_id} has no weighed quantity"))
    })?;

    let flipped = PickupRequest::update_many()
        .col_expr(
            pickup_request::Column::PaymentStatus,
            Expr::value(PaymentStatus::Paid.as_str()),
        )
        .filter(pickup_request::Column::Id.eq(request_id))
        .filter(pickup_request::Column::PaymentStatus.eq(PaymentStatus::Unpaid.as_str()))
        .filter(pickup_request::Column::Status.eq(PickupStatus::Completed.as_str()))
        .exec(&txn)
        .await?;
    if flipped.rows_affected != 1 {
        return Err(Error::invalid_state(format!(
            "Pickup {request_id} changed while settling"
        )));
    }

    let amount = pickup.payment_amount;
    Customer::update_many()
        .col_expr(
            customer::Column::TotalEarnings,
            Expr::col(customer::Column::TotalEarnings).add(amount),
        )
        .col_expr(
            customer::Column::AccountBalance,
            Expr::col(customer::Column::AccountBalance).add(amount),
        )
        .col_expr(
            customer::Column::TotalWasteSold,
            Expr::col(customer::Column::TotalWasteSold).add(quantity),
        )
        .filter(customer::Column::Id.eq(pickup.customer_id))
        .exec(&txn)
        .await?;

    let pickup = PickupRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Pickup request", request_id))?;
    let customer = Customer::find_by_id(pickup.customer_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Customer profile", pickup.customer_id))?;

    txn.commit().await?;

    info!(admin_id = admin.id, amount, "pickup settled");
    Ok(SettlementOutcome::Settled { pickup, customer })
}
