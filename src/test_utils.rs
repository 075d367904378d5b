//! Shared test utilities for Kompost Hub.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test accounts, pickups and logs with sensible defaults.

use crate::{
    core::{
        identity::{
            self, AdminAccount, AdminRegistration, CredentialHasher, CustomerAccount,
            CustomerRegistration,
        },
        pickup::{self, CreatedPickup, StatusUpdate},
        pricing,
        status::{AdminRole, PickupStatus},
    },
    entities::{collection_log, composting_process, pickup_request},
    errors::Result,
};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Marks the password instead of hashing it, so tests can assert on the stored credential.
pub struct TestHasher;

impl CredentialHasher for TestHasher {
    fn hash(&self, password: &str) -> String {
        format!("hashed:{password}")
    }
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a customer with sensible defaults.
///
/// # Defaults
/// * `first_name`: "Test"
/// * `address`: "1 Test Street"
/// * `city`: "Dhaka"
pub async fn create_test_customer(db: &DatabaseConnection, email: &str) -> Result<CustomerAccount> {
    identity::register_customer(
        db,
        CustomerRegistration {
            email: email.to_string(),
            password: "password1".to_string(),
            phone: "01700000000".to_string(),
            first_name: "Test".to_string(),
            last_name: None,
            address: "1 Test Street".to_string(),
            city: "Dhaka".to_string(),
        },
        &TestHasher,
    )
    .await
}

/// Registers a staff member with the given role.
pub async fn create_test_admin(
    db: &DatabaseConnection,
    email: &str,
    role: AdminRole,
) -> Result<AdminAccount> {
    identity::register_admin(
        db,
        AdminRegistration {
            email: email.to_string(),
            password: "password1".to_string(),
            phone: "01800000000".to_string(),
            first_name: "Staff".to_string(),
            last_name: None,
            role: role.as_str().to_string(),
            hub_location: Some("Test Hub".to_string()),
            department: None,
        },
        &TestHasher,
    )
    .await
}

/// Sets up a test database with one customer.
/// Returns (db, customer) for common test scenarios.
pub async fn setup_with_customer() -> Result<(DatabaseConnection, CustomerAccount)> {
    let db = setup_test_db().await?;
    let customer = create_test_customer(&db, "customer@example.com").await?;
    Ok((db, customer))
}

/// Creates an `"organic"` pickup request without notes.
pub async fn create_test_pickup(
    db: &DatabaseConnection,
    customer_id: i64,
    is_sorted: bool,
    quantity_kg: f64,
) -> Result<CreatedPickup> {
    pickup::create_request(db, customer_id, "organic", is_sorted, quantity_kg, None).await
}

/// Applies a status change without a quantity.
pub async fn set_status(
    db: &DatabaseConnection,
    request_id: i64,
    status: PickupStatus,
    admin_user_id: i64,
) -> Result<pickup_request::Model> {
    pickup::update_status(
        db,
        request_id,
        StatusUpdate {
            status,
            actual_quantity_kg: None,
            notes: None,
        },
        admin_user_id,
    )
    .await
}

/// Collects a pickup with the given weighed quantity, then marks it completed.
pub async fn complete_pickup(
    db: &DatabaseConnection,
    request_id: i64,
    quantity_kg: f64,
    admin_user_id: i64,
) -> Result<pickup_request::Model> {
    pickup::update_status(
        db,
        request_id,
        StatusUpdate {
            status: PickupStatus::Collected,
            actual_quantity_kg: Some(quantity_kg),
            notes: None,
        },
        admin_user_id,
    )
    .await?;
    set_status(db, request_id, PickupStatus::Completed, admin_user_id).await
}

/// The current local time moved back by `days` days.
#[must_use]
pub fn days_ago(days: i64) -> NaiveDateTime {
    Local::now().naive_local() - Duration::days(days)
}

/// Rewrites a pickup's `created_at`.
pub async fn backdate_pickup(
    db: &DatabaseConnection,
    request_id: i64,
    created_at: NaiveDateTime,
) -> Result<()> {
    let pickup = pickup_request::Entity::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or_else(|| crate::errors::Error::not_found("Pickup request", request_id))?;
    let mut active: pickup_request::ActiveModel = pickup.into();
    active.created_at = Set(created_at);
    active.update(db).await?;
    Ok(())
}

/// Creates a pickup and writes a collection log for it dated `date`.
///
/// The pickup's declared quantity is raised to the category minimum when
/// `quantity_kg` is below it, so any log quantity can be used.
pub async fn insert_test_log(
    db: &DatabaseConnection,
    customer_id: i64,
    admin_id: i64,
    date: NaiveDate,
    waste_type: &str,
    is_sorted: bool,
    quantity_kg: f64,
) -> Result<collection_log::Model> {
    let estimated = quantity_kg.max(pricing::minimum_quantity_kg(is_sorted));
    let created =
        pickup::create_request(db, customer_id, waste_type, is_sorted, estimated, None).await?;

    let log = collection_log::ActiveModel {
        pickup_request_id: Set(created.pickup.id),
        collection_date: Set(date),
        collected_by_admin_id: Set(admin_id),
        waste_type: Set(waste_type.to_string()),
        is_sorted: Set(is_sorted),
        quantity_kg: Set(quantity_kg),
        sorting_notes: Set(String::new()),
        ..Default::default()
    };
    Ok(log.insert(db).await?)
}

/// Inserts a composting batch in the `"active"` state.
pub async fn insert_test_batch(
    db: &DatabaseConnection,
    batch_number: &str,
    waste_collection_log_id: Option<i64>,
    process_start_date: NaiveDate,
) -> Result<composting_process::Model> {
    let batch = composting_process::ActiveModel {
        batch_number: Set(batch_number.to_string()),
        waste_collection_log_id: Set(waste_collection_log_id),
        status: Set("active".to_string()),
        process_start_date: Set(process_start_date),
        estimated_completion_date: Set(Some(process_start_date + Duration::days(45))),
        actual_completion_date: Set(None),
        initial_quantity_kg: Set(100.0),
        final_quantity_kg: Set(None),
        compost_grade: Set(None),
        ..Default::default()
    };
    Ok(batch.insert(db).await?)
}
