//! # wo-state — Work-Order Lifecycle Engine
//!
//! The decision core that moves an engineering work order ("OS") from
//! creation to financial close.
//!
//! ## State Machine
//!
//! ```text
//! Open ──▶ Planning ──▶ PendingAcceptance ──▶ Executing ──▶ PendingClosureAcceptance ──▶ Closed
//!                                                 │                   ▲
//!                                                 └──── finalize() ───┘
//! ```
//!
//! Plus the side exits `Cancelled` and `Rejected` from every non-terminal
//! phase. See [`phase`] for the transition table.
//!
//! ## Design
//!
//! Phases and edges are closed enums matched exhaustively; no string
//! status codes are dispatched on. Every operation is a pure function of
//! `(&record, input)` returning a new record or a [`LifecycleError`]: the
//! engine holds no store or client, and time comes from an injected
//! [`wo_core::Clock`].
//!
//! Concurrency is the caller's concern. Two callers that load the same
//! record and both write back will lose an update unless the store checks
//! [`WorkOrderRecord::version`] on write.

pub mod error;
pub mod lifecycle;
pub mod phase;
pub mod record;
pub mod settlement;

pub use error::{IssuerError, LifecycleError};
pub use lifecycle::{EdgeInput, LifecycleEngine, NumberIssuer, PlanInput};
pub use phase::{transition_target, Edge, Phase};
pub use record::{
    OpenWorkOrderRequest, PhaseTransitionRecord, Settlement, TransitionAction, WorkOrderRecord,
};
pub use settlement::{SettlementCalculator, SettlementInput, SAVINGS_SCALE};

/// Whether `status` is terminal. Shorthand for [`Phase::is_terminal`].
pub fn is_terminal(status: Phase) -> bool {
    status.is_terminal()
}

/// Phases reachable from `status` in one action. Shorthand for
/// [`Phase::allowed_next_phases`].
pub fn allowed_next_phases(status: Phase) -> &'static [Phase] {
    status.allowed_next_phases()
}
