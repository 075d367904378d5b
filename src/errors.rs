//! Unified error type for the pickup ledger.
//!
//! Every core operation returns [`Result`]. The API layer that sits in front of
//! the core maps each variant to a transport status code.

use thiserror::Error;

/// All errors the core can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-policy input (missing fields, bad email, below-minimum quantity, unknown status).
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable explanation, safe to show to the caller
        message: String,
    },

    /// Referenced entity is absent or not owned by the caller.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up (e.g. "Pickup request")
        entity: &'static str,
        /// Identifier the caller supplied
        id: String,
    },

    /// Caller lacks the required role or profile.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// What was missing
        message: String,
    },

    /// Requested transition is not permitted from the current lifecycle state.
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Which transition was refused and why
        message: String,
    },

    /// Underlying persistence failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Details of the configuration problem
        message: String,
    },
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`] for the given entity kind and id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`Error::InvalidState`] with the given message.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Unauthorized`] with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
