//! Typed views over the string columns that drive the pickup lifecycle and authorization.
//!
//! The database stores statuses and roles as plain strings. Everything in `core`
//! converts to these enums at the boundary so that an unknown value is rejected
//! once, with a validation error, instead of leaking into business rules.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a pickup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    /// Created by the customer, not yet planned
    Requested,
    /// Staff picked a date
    Scheduled,
    /// Truck is on the way
    InTransit,
    /// Waste was weighed and loaded
    Collected,
    /// Processing of the pickup is finished
    Completed,
    /// Withdrawn; terminal
    Cancelled,
}

impl PickupStatus {
    /// Statuses staff may set through a status update.
    pub const ADMIN_SETTABLE: [Self; 5] = [
        Self::Scheduled,
        Self::InTransit,
        Self::Collected,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Statuses from which the owning customer may still cancel.
    pub const CUSTOMER_CANCELLABLE: [Self; 2] = [Self::Requested, Self::Scheduled];

    /// Statuses shown in the dashboard's service queue.
    pub const PENDING: [Self; 3] = [Self::Requested, Self::Scheduled, Self::InTransit];

    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Scheduled => "scheduled",
            Self::InTransit => "in_transit",
            Self::Collected => "collected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether staff may set this status directly.
    #[must_use]
    pub fn is_admin_settable(self) -> bool {
        Self::ADMIN_SETTABLE.contains(&self)
    }

    /// Parses a raw status coming from staff, rejecting anything outside [`Self::ADMIN_SETTABLE`].
    pub fn parse_admin_settable(raw: &str) -> Result<Self> {
        raw.parse::<Self>()
            .ok()
            .filter(|status| status.is_admin_settable())
            .ok_or_else(|| Error::validation(format!("Invalid status: {raw}")))
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickupStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "requested" => Ok(Self::Requested),
            "scheduled" => Ok(Self::Scheduled),
            "in_transit" => Ok(Self::InTransit),
            "collected" => Ok(Self::Collected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::validation(format!("Invalid status: {other}"))),
        }
    }
}

/// Whether the customer has been paid for a pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing credited yet
    Unpaid,
    /// Settled and posted to the customer's counters
    Paid,
}

impl PaymentStatus {
    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            other => Err(Error::validation(format!("Invalid payment status: {other}"))),
        }
    }
}

/// Staff role stored on the admin profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access
    SuperAdmin,
    /// Runs a collection hub
    HubManager,
    /// Drives and collects
    CollectionStaff,
    /// Runs composting
    Processor,
}

impl AdminRole {
    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::HubManager => "hub_manager",
            Self::CollectionStaff => "collection_staff",
            Self::Processor => "processor",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "hub_manager" => Ok(Self::HubManager),
            "collection_staff" => Ok(Self::CollectionStaff),
            "processor" => Ok(Self::Processor),
            _ => Err(Error::validation("Invalid role")),
        }
    }
}

/// An operation family that is gated on staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Dashboard summary
    ViewDashboard,
    /// Admin pickup listing, status updates and scheduling
    ManagePickups,
    /// Collection statistics
    ViewCollectionStats,
    /// Composting overview
    ViewComposting,
    /// Marking completed pickups as paid
    SettlePayments,
}

impl Capability {
    /// Roles that hold this capability.
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [AdminRole] {
        use AdminRole::{CollectionStaff, HubManager, Processor, SuperAdmin};
        match self {
            Self::ViewDashboard => &[SuperAdmin, HubManager, CollectionStaff, Processor],
            Self::ManagePickups => &[SuperAdmin, HubManager, CollectionStaff],
            Self::ViewCollectionStats | Self::SettlePayments => &[SuperAdmin, HubManager],
            Self::ViewComposting => &[SuperAdmin, HubManager, Processor],
        }
    }

    /// Whether `role` holds this capability.
    #[must_use]
    pub fn permits(self, role: AdminRole) -> bool {
        self.allowed_roles().contains(&role)
    }
}
