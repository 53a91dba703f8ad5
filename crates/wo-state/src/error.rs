//! # Lifecycle Errors
//!
//! Every engine failure is one of three kinds. All are returned to the
//! immediate caller; the engine never retries, logs, or partially applies
//! a change.

use thiserror::Error;

use wo_core::CostCenterId;

use crate::phase::Phase;
use crate::record::TransitionAction;

/// Failure of a lifecycle operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// The action does not leave the record's current phase, or the record
    /// is already terminal.
    #[error("invalid transition from {from} via {action}: {reason}")]
    InvalidTransition {
        /// Phase the record was in.
        from: Phase,
        /// What the caller attempted.
        action: TransitionAction,
        /// Why it was refused.
        reason: String,
    },

    /// Required input missing or out of range.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The numbering authority failed; surfaced as-is.
    #[error(transparent)]
    IssuerFailure(#[from] IssuerError),
}

impl LifecycleError {
    pub(crate) fn transition(
        from: Phase,
        action: TransitionAction,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            from,
            action,
            reason: reason.into(),
        }
    }

    pub(crate) fn input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this is an [`LifecycleError::InvalidTransition`].
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Whether this is an [`LifecycleError::InvalidInput`].
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

/// Failure reported by a [`crate::NumberIssuer`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssuerError {
    /// The numbering authority could not be reached or refused to answer.
    #[error("numbering authority unavailable: {0}")]
    Unavailable(String),

    /// No more numbers can be issued for the cost center.
    #[error("number sequence exhausted for cost center {0}")]
    Exhausted(CostCenterId),

    /// The cost center is unknown to, or blocked by, the numbering authority.
    #[error("numbering authority rejected cost center {cost_center}: {reason}")]
    Rejected {
        cost_center: CostCenterId,
        reason: String,
    },
}
