//! # Work-Order Phases and the Transition Table
//!
//! ## States
//!
//! ```text
//! Open ──▶ Planning ──▶ PendingAcceptance ──▶ Executing ──▶ PendingClosureAcceptance ──▶ Closed
//!   │          │                │                 │                    │
//!   └──────────┴────────────────┴─────────────────┴────────────────────┴──▶ Cancelled | Rejected
//! ```
//!
//! Forward movement happens only through a named [`Edge`]. The table is the
//! exhaustive `match` in [`Edge::from_phase`] / [`Edge::to_phase`]; there is
//! no string dispatch anywhere in the engine. `Cancelled` and `Rejected`
//! are side exits, not edges, and are reachable from every non-terminal
//! phase.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Created, number issued, nothing planned yet.
    Open,
    /// Engineering is preparing dates, hours and budget.
    Planning,
    /// Plan submitted, awaiting the requester's acceptance.
    PendingAcceptance,
    /// Work in progress.
    Executing,
    /// Execution ended; awaiting administrative acceptance of the close.
    PendingClosureAcceptance,
    /// Accepted and closed (terminal).
    Closed,
    /// Withdrawn before completion (terminal).
    Cancelled,
    /// Refused by the requester or administration (terminal).
    Rejected,
}

impl Phase {
    /// Every phase, forward ordering first, then the side exits.
    pub const ALL: [Phase; 8] = [
        Phase::Open,
        Phase::Planning,
        Phase::PendingAcceptance,
        Phase::Executing,
        Phase::PendingClosureAcceptance,
        Phase::Closed,
        Phase::Cancelled,
        Phase::Rejected,
    ];

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled | Self::Rejected)
    }

    /// Position in the forward ordering
    /// `Open < Planning < PendingAcceptance < Executing < PendingClosureAcceptance < Closed`.
    ///
    /// `None` for the side exits, which sit outside the forward chain.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::Open => Some(0),
            Self::Planning => Some(1),
            Self::PendingAcceptance => Some(2),
            Self::Executing => Some(3),
            Self::PendingClosureAcceptance => Some(4),
            Self::Closed => Some(5),
            Self::Cancelled | Self::Rejected => None,
        }
    }

    /// The forward edge leaving this phase, if any.
    pub fn outgoing_edge(&self) -> Option<Edge> {
        match self {
            Self::Open => Some(Edge::StartPlanning),
            Self::Planning => Some(Edge::SubmitPlan),
            Self::PendingAcceptance => Some(Edge::ApproveExecution),
            Self::Executing => Some(Edge::CompleteExecution),
            Self::PendingClosureAcceptance => Some(Edge::AcceptClosure),
            Self::Closed | Self::Cancelled | Self::Rejected => None,
        }
    }

    /// Phases reachable from this one in a single action: the forward
    /// target plus the two side exits. Empty for terminal phases.
    ///
    /// Used by presentation layers to decide which actions to offer.
    pub fn allowed_next_phases(&self) -> &'static [Phase] {
        match self {
            Self::Open => &[Self::Planning, Self::Cancelled, Self::Rejected],
            Self::Planning => &[Self::PendingAcceptance, Self::Cancelled, Self::Rejected],
            Self::PendingAcceptance => &[Self::Executing, Self::Cancelled, Self::Rejected],
            Self::Executing => &[
                Self::PendingClosureAcceptance,
                Self::Cancelled,
                Self::Rejected,
            ],
            Self::PendingClosureAcceptance => &[Self::Closed, Self::Cancelled, Self::Rejected],
            Self::Closed | Self::Cancelled | Self::Rejected => &[],
        }
    }

    /// Whether a settlement may be computed from this phase.
    pub fn accepts_settlement(&self) -> bool {
        matches!(self, Self::Executing | Self::PendingClosureAcceptance)
    }

    /// Whether the budget can still be revised (frozen once execution starts).
    pub fn budget_open(&self) -> bool {
        matches!(self, Self::Open | Self::Planning | Self::PendingAcceptance)
    }

    /// The stable name used in persisted records and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Planning => "PLANNING",
            Self::PendingAcceptance => "PENDING_ACCEPTANCE",
            Self::Executing => "EXECUTING",
            Self::PendingClosureAcceptance => "PENDING_CLOSURE_ACCEPTANCE",
            Self::Closed => "CLOSED",
            Self::Cancelled => "CANCELLED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Inverse of [`Phase::as_str`]. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named forward edge of the lifecycle.
///
/// Callers state which edge they intend to take; [`crate::LifecycleEngine::advance`]
/// refuses the call unless the record currently sits at that edge's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Edge {
    /// Open → Planning.
    StartPlanning,
    /// Planning → PendingAcceptance. Carries the plan.
    SubmitPlan,
    /// PendingAcceptance → Executing.
    ApproveExecution,
    /// Executing → PendingClosureAcceptance. Stamps `completed_at`.
    CompleteExecution,
    /// PendingClosureAcceptance → Closed.
    AcceptClosure,
}

impl Edge {
    pub const ALL: [Edge; 5] = [
        Edge::StartPlanning,
        Edge::SubmitPlan,
        Edge::ApproveExecution,
        Edge::CompleteExecution,
        Edge::AcceptClosure,
    ];

    /// Source phase of the edge.
    pub fn from_phase(&self) -> Phase {
        match self {
            Self::StartPlanning => Phase::Open,
            Self::SubmitPlan => Phase::Planning,
            Self::ApproveExecution => Phase::PendingAcceptance,
            Self::CompleteExecution => Phase::Executing,
            Self::AcceptClosure => Phase::PendingClosureAcceptance,
        }
    }

    /// Target phase of the edge.
    pub fn to_phase(&self) -> Phase {
        match self {
            Self::StartPlanning => Phase::Planning,
            Self::SubmitPlan => Phase::PendingAcceptance,
            Self::ApproveExecution => Phase::Executing,
            Self::CompleteExecution => Phase::PendingClosureAcceptance,
            Self::AcceptClosure => Phase::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartPlanning => "START_PLANNING",
            Self::SubmitPlan => "SUBMIT_PLAN",
            Self::ApproveExecution => "APPROVE_EXECUTION",
            Self::CompleteExecution => "COMPLETE_EXECUTION",
            Self::AcceptClosure => "ACCEPT_CLOSURE",
        }
    }

    /// Inverse of [`Edge::as_str`], case-insensitive and accepting `-` for `_`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL.into_iter().find(|e| e.as_str() == normalized)
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The transition table: target phase of `edge` when taken from `phase`.
///
/// `None` when `edge` does not leave `phase`.
pub fn transition_target(phase: Phase, edge: Edge) -> Option<Phase> {
    (edge.from_phase() == phase).then(|| edge.to_phase())
}
