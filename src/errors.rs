//! Unified error type for the feedlot backend.
//!
//! The core layers never recover from failures locally. Every error travels
//! up to the HTTP layer, which maps it to a status code in `api::error`.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The database could not be reached or a query failed
    #[error("Data source unavailable: {0}")]
    DataUnavailable(#[from] sea_orm::DbErr),

    /// A data-source call exceeded the configured timeout
    #[error("Operation '{operation}' timed out after {millis}ms")]
    Timeout {
        /// Name of the operation that was cut off
        operation: &'static str,
        /// Timeout that was exceeded
        millis: u128,
    },

    /// Input failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// Monetary amount is negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Requested row does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"pen"`
        entity: &'static str,
        /// Primary key or lookup value
        id: String,
    },

    /// Request conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable reason
        message: String,
    },

    /// Chart period outside day/week/month/year
    #[error("Invalid period '{value}', expected one of day, week, month, year")]
    InvalidPeriod {
        /// The rejected value
        value: String,
    },

    /// One section of the combined dashboard failed
    #[error("Dashboard section '{section}' failed: {source}")]
    DashboardSection {
        /// `metrics`, `charts` or `alerts`
        section: &'static str,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Missing or unknown credentials
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable reason
        message: String,
    },

    /// Authenticated user lacks the required role
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable reason
        message: String,
    },

    /// I/O failure (config files, socket binding)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bind address could not be parsed
    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`] keyed by a numeric id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
