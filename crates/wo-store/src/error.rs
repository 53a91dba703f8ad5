//! # Store and Service Errors
//!
//! `StoreError` covers the persistence boundary: missing records, lost
//! optimistic-concurrency races, and snapshot I/O. `ServiceError` is what
//! callers of [`crate::WorkOrderService`] see: either a lifecycle refusal
//! from the engine or a store failure. Each maps to a stable
//! machine-readable code for operator output.

use thiserror::Error;

use wo_core::WorkOrderId;
use wo_state::LifecycleError;

/// Failure at the persistence boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this identifier.
    #[error("work order {0} not found")]
    NotFound(WorkOrderId),

    /// The record changed since the caller loaded it.
    #[error(
        "work order {id} was modified concurrently: expected version {expected}, found {actual}"
    )]
    ConcurrentModification {
        id: WorkOrderId,
        /// Version the caller loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// A write tried to insert a record that already has an identifier, or
    /// update one that has none.
    #[error("work order persistence mismatch: {0}")]
    Persistence(String),

    /// A write tried to change a field that is immutable after creation.
    #[error("work order {id}: {field} is immutable after creation")]
    ImmutableField { id: WorkOrderId, field: &'static str },

    /// Reading or writing the JSON snapshot failed.
    #[error("snapshot {path}: {reason}")]
    Snapshot { path: String, reason: String },

    /// The snapshot was rewritten by someone else since it was loaded.
    #[error("snapshot {path} changed on disk: loaded generation {expected}, found {actual}")]
    StaleSnapshot {
        path: String,
        expected: u64,
        actual: u64,
    },

    /// Another invocation holds the snapshot lock.
    #[error("snapshot {path} is locked by another process")]
    Locked { path: String },
}

/// Failure of a [`crate::WorkOrderService`] operation.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Lifecycle(LifecycleError::InvalidTransition { .. }) => "INVALID_TRANSITION",
            Self::Lifecycle(LifecycleError::InvalidInput { .. }) => "INVALID_INPUT",
            Self::Lifecycle(LifecycleError::IssuerFailure(_)) => "ISSUER_FAILURE",
            Self::Store(StoreError::NotFound(_)) => "NOT_FOUND",
            Self::Store(
                StoreError::ConcurrentModification { .. } | StoreError::StaleSnapshot { .. },
            ) => "CONCURRENT_MODIFICATION",
            Self::Store(StoreError::Persistence(_) | StoreError::ImmutableField { .. }) => {
                "PERSISTENCE_ERROR"
            }
            Self::Store(StoreError::Snapshot { .. }) => "SNAPSHOT_ERROR",
            Self::Store(StoreError::Locked { .. }) => "SNAPSHOT_LOCKED",
        }
    }

    /// Whether the caller lost an optimistic-concurrency race and may reload
    /// and retry.
    pub fn is_concurrent_modification(&self) -> bool {
        matches!(self, Self::Store(StoreError::ConcurrentModification { .. }))
    }
}
