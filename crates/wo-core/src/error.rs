//! # Error Types
//!
//! Parse and construction failures for the primitives in this crate.
//! Lifecycle, settlement and persistence errors live in the crates that
//! own those concerns.

use thiserror::Error;

/// Error constructing or parsing a core primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WoError {
    /// A timestamp string or epoch value could not be interpreted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An accounting period token is not of the form `MM/YYYY`.
    #[error("invalid accounting period: {0}")]
    InvalidPeriod(String),

    /// An identifier failed validation (blank, malformed).
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
