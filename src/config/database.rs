//! Database configuration module for Kompost Hub.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust models. The one constraint the entities cannot
//! express, a unique index on the collection log's pickup reference, is added here.

use crate::entities::{
    Admin, CollectionLog, CompostingProcess, Customer, PickupRequest, User, collection_log,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, TableCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/kompost_hub.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// The returned handle is the single storage handle for the process; it is passed
/// by reference into every core operation and closed when the process exits.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!(%database_url, "connecting to database");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables (if missing) plus the one-log-per-pickup unique index.
///
/// Parents are created before children so foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut tables: Vec<TableCreateStatement> = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Customer),
        schema.create_table_from_entity(Admin),
        schema.create_table_from_entity(PickupRequest),
        schema.create_table_from_entity(CollectionLog),
        schema.create_table_from_entity(CompostingProcess),
    ];

    for table in &mut tables {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    let one_log_per_pickup = Index::create()
        .name("idx_unique_collection_log_pickup")
        .table(CollectionLog)
        .col(collection_log::Column::PickupRequestId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&one_log_per_pickup)).await?;

    info!("Database tables ensured.");
    Ok(())
}
