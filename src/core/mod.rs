//! Core business logic - framework-agnostic pickup ledger, collection recording,
//! settlement and reporting. Every operation takes the database handle it should
//! run against and returns [`crate::errors::Result`].

/// Collection log writing
pub mod collection;
/// Read projection of composting batches
pub mod composting;
/// Account registration, profile resolution and role checks
pub mod identity;
/// Pickup request lifecycle
pub mod pickup;
/// Rates and minimum quantities
pub mod pricing;
/// Dashboard, statistics and earnings
pub mod report;
/// Payment posting for completed pickups
pub mod settlement;
/// Typed statuses, roles and capabilities
pub mod status;
