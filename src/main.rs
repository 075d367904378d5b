use dotenvy::dotenv;
use kompost_hub::{
    config::{database, settings},
    core::{identity, report},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(
        max_page_size = app_config.listing.max_page_size,
        staff = app_config.staff.len(),
        "Configuration loaded."
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed staff accounts from config.toml
    let seeded = identity::seed_staff(&db, &app_config.staff)
        .await
        .inspect_err(|e| error!("Failed to seed staff accounts: {}", e))?;
    info!(seeded, "Staff accounts ensured.");

    // 6. Report the current state of the ledger
    let summary = report::dashboard_summary(&db).await?;
    info!(
        date = %summary.date,
        today_pickups = summary.today.pickups,
        today_revenue = summary.today.revenue,
        total_customers = summary.overall.total_customers,
        total_pickups = summary.overall.total_pickups,
        pending = summary.pending_queue.len(),
        "Ledger ready."
    );

    db.close().await?;
    Ok(())
}
