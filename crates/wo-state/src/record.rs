//! # Work-Order Record
//!
//! The entity the engine reads and produces updated copies of. Fields the
//! engine owns (phase, planning figures, stamps, settlement) are private and
//! change only through [`crate::LifecycleEngine`]; the persistence layer may
//! only assign the store identifier and the version token.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wo_core::{AccountingPeriod, CostCenterId, Timestamp, UserId, WorkOrderId, WorkOrderNumber};

use crate::error::LifecycleError;
use crate::phase::{Edge, Phase};

/// What produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind", content = "edge")]
pub enum TransitionAction {
    /// A forward edge.
    Advance(Edge),
    /// The closing settlement.
    Finalize,
    /// Side exit to `Cancelled`.
    Cancel,
    /// Side exit to `Rejected`.
    Reject,
}

impl std::fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advance(edge) => write!(f, "{edge}"),
            Self::Finalize => f.write_str("FINALIZE"),
            Self::Cancel => f.write_str("CANCEL"),
            Self::Reject => f.write_str("REJECT"),
        }
    }
}

/// One entry of the record's transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransitionRecord {
    pub from: Phase,
    pub to: Phase,
    pub action: TransitionAction,
    pub at: Timestamp,
    /// Free-text note (exit reason, justification).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The closing financial figures of a work order.
///
/// Held as one `Option` on the record: either every figure is present or
/// none is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Engineering's valuation of the delivered work.
    pub engineering_cost: Decimal,
    /// Amount actually contracted/charged.
    pub procurement_cost: Decimal,
    /// Booked cost; equal to `procurement_cost`.
    pub final_cost: Decimal,
    /// Signed savings against the budget, in percent, unrounded.
    pub savings_percent: Decimal,
    /// `MM/YYYY` period the cost is booked to.
    pub accounting_period: AccountingPeriod,
    /// Actual delivery instant.
    pub actual_delivered_at: Timestamp,
    /// Explanation recorded when engineering value diverges from budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_justification: Option<String>,
}

/// A contracted unit of engineering work ("OS") tied to a cost center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<WorkOrderId>,
    number: WorkOrderNumber,
    cost_center_id: CostCenterId,
    discipline: String,
    #[serde(default)]
    involved_disciplines: BTreeSet<String>,
    description: String,
    status: Phase,
    budget_amount: Decimal,
    #[serde(default)]
    planned_start_date: Option<NaiveDate>,
    #[serde(default)]
    planned_end_date: Option<NaiveDate>,
    #[serde(default)]
    planned_labor_hours: Option<Decimal>,
    #[serde(default)]
    extra_labor_hours: Decimal,
    opened_at: Timestamp,
    #[serde(default)]
    completed_at: Option<Timestamp>,
    #[serde(default)]
    settlement: Option<Settlement>,
    requester_id: UserId,
    responsible_engineer_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit_reason: Option<String>,
    #[serde(default)]
    version: u64,
    #[serde(default)]
    history: Vec<PhaseTransitionRecord>,
}

/// Creation-time attributes of a work order, minus the issued number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenWorkOrderRequest {
    pub cost_center_id: CostCenterId,
    pub discipline: String,
    #[serde(default)]
    pub involved_disciplines: BTreeSet<String>,
    pub description: String,
    pub budget_amount: Decimal,
    pub requester_id: UserId,
    pub responsible_engineer_id: UserId,
}

impl WorkOrderRecord {
    /// Build a fresh `Open` record. Validation happens in
    /// [`crate::LifecycleEngine::open`], which is the only caller.
    pub(crate) fn opened(
        request: OpenWorkOrderRequest,
        number: WorkOrderNumber,
        opened_at: Timestamp,
    ) -> Self {
        Self {
            id: None,
            number,
            cost_center_id: request.cost_center_id,
            discipline: request.discipline.trim().to_string(),
            involved_disciplines: request.involved_disciplines,
            description: request.description,
            status: Phase::Open,
            budget_amount: request.budget_amount,
            planned_start_date: None,
            planned_end_date: None,
            planned_labor_hours: None,
            extra_labor_hours: Decimal::ZERO,
            opened_at,
            completed_at: None,
            settlement: None,
            requester_id: request.requester_id,
            responsible_engineer_id: request.responsible_engineer_id,
            exit_reason: None,
            version: 0,
            history: Vec::new(),
        }
    }

    // ── Persistence hooks ────────────────────────────────────────────

    /// Assign the store identifier and version after a successful write.
    ///
    /// An identifier, once assigned, is kept; only the version moves.
    pub fn mark_persisted(&mut self, id: WorkOrderId, version: u64) {
        if self.id.is_none() {
            self.id = Some(id);
        }
        self.version = version;
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> Option<WorkOrderId> {
        self.id
    }

    pub fn number(&self) -> &WorkOrderNumber {
        &self.number
    }

    pub fn cost_center_id(&self) -> CostCenterId {
        self.cost_center_id
    }

    pub fn discipline(&self) -> &str {
        &self.discipline
    }

    pub fn involved_disciplines(&self) -> &BTreeSet<String> {
        &self.involved_disciplines
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Phase {
        self.status
    }

    /// Planned value ("SAO"). Baseline for the savings ratio.
    pub fn budget_amount(&self) -> Decimal {
        self.budget_amount
    }

    pub fn planned_start_date(&self) -> Option<NaiveDate> {
        self.planned_start_date
    }

    pub fn planned_end_date(&self) -> Option<NaiveDate> {
        self.planned_end_date
    }

    pub fn planned_labor_hours(&self) -> Option<Decimal> {
        self.planned_labor_hours
    }

    pub fn extra_labor_hours(&self) -> Decimal {
        self.extra_labor_hours
    }

    pub fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    pub fn requester_id(&self) -> &UserId {
        &self.requester_id
    }

    pub fn responsible_engineer_id(&self) -> &UserId {
        &self.responsible_engineer_id
    }

    /// Reason given for a cancel or reject side exit.
    pub fn exit_reason(&self) -> Option<&str> {
        self.exit_reason.as_deref()
    }

    /// Optimistic-concurrency token. Owned by the store.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Ordered transition log.
    pub fn history(&self) -> &[PhaseTransitionRecord] {
        &self.history
    }

    // ── Derived values ───────────────────────────────────────────────

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }

    /// Planned plus extra labor hours. Zero planned hours before planning.
    pub fn total_labor_hours(&self) -> Decimal {
        self.planned_labor_hours.unwrap_or(Decimal::ZERO) + self.extra_labor_hours
    }

    /// Engineering cost minus budget, once settled. Positive means the
    /// engineering valuation exceeded the plan.
    pub fn engineering_divergence(&self) -> Option<Decimal> {
        self.settlement
            .as_ref()
            .map(|s| s.engineering_cost - self.budget_amount)
    }

    // ── Consistency ──────────────────────────────────────────────────

    /// Check that the record is one the engine could have produced.
    ///
    /// Records built by [`crate::LifecycleEngine`] always pass. Records
    /// deserialized from outside (a snapshot file) may not, and the store
    /// refuses them before they reach the engine.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidInput`] naming the first inconsistent field.
    pub fn check_invariants(&self) -> Result<(), LifecycleError> {
        non_negative("budget_amount", self.budget_amount)?;
        non_negative("extra_labor_hours", self.extra_labor_hours)?;
        if let Some(hours) = self.planned_labor_hours {
            non_negative("planned_labor_hours", hours)?;
        }
        if self.number.as_str().trim().is_empty() {
            return Err(LifecycleError::input("number", "must not be blank"));
        }

        let mut phase = Phase::Open;
        for (i, entry) in self.history.iter().enumerate() {
            if entry.from != phase || !action_leads(entry.action, entry.from, entry.to) {
                return Err(LifecycleError::input(
                    "history",
                    format!(
                        "entry {i} ({} via {}) does not follow {phase}",
                        entry.to, entry.action
                    ),
                ));
            }
            phase = entry.to;
        }
        if phase != self.status {
            return Err(LifecycleError::input(
                "status",
                format!("{} does not match the history, which ends at {phase}", self.status),
            ));
        }

        let took = |action: TransitionAction| self.history.iter().any(|t| t.action == action);
        let planned = took(TransitionAction::Advance(Edge::SubmitPlan));
        let plan_fields = [
            self.planned_start_date.is_some(),
            self.planned_end_date.is_some(),
            self.planned_labor_hours.is_some(),
        ];
        if plan_fields.iter().any(|set| *set != planned) {
            return Err(LifecycleError::input(
                "planned_labor_hours",
                "planning fields must be set exactly when a plan was submitted",
            ));
        }
        if let (Some(start), Some(end)) = (self.planned_start_date, self.planned_end_date) {
            if end < start {
                return Err(LifecycleError::input(
                    "planned_end_date",
                    format!("{end} is before planned start {start}"),
                ));
            }
        }
        if !planned && !self.extra_labor_hours.is_zero() {
            return Err(LifecycleError::input(
                "extra_labor_hours",
                "extra hours recorded without a submitted plan",
            ));
        }

        let finalized = took(TransitionAction::Finalize);
        if finalized != self.settlement.is_some() {
            return Err(LifecycleError::input(
                "settlement",
                "settlement must be present exactly when the record was finalized",
            ));
        }
        if let Some(s) = &self.settlement {
            non_negative("engineering_cost", s.engineering_cost)?;
            non_negative("procurement_cost", s.procurement_cost)?;
            if s.final_cost != s.procurement_cost {
                return Err(LifecycleError::input(
                    "final_cost",
                    format!(
                        "{} differs from procurement cost {}",
                        s.final_cost, s.procurement_cost
                    ),
                ));
            }
        }

        let completed = finalized || took(TransitionAction::Advance(Edge::CompleteExecution));
        if completed != self.completed_at.is_some() {
            return Err(LifecycleError::input(
                "completed_at",
                "completion stamp must be present exactly when execution ended",
            ));
        }

        if self.id.is_some() && self.version < self.history.len() as u64 + 1 {
            return Err(LifecycleError::input(
                "version",
                format!(
                    "version {} is behind {} recorded transitions",
                    self.version,
                    self.history.len()
                ),
            ));
        }
        Ok(())
    }

    // ── Engine-internal mutation (on a private copy) ─────────────────

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) fn set_budget(&mut self, amount: Decimal) {
        self.budget_amount = amount;
    }

    pub(crate) fn apply_plan(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        planned_hours: Decimal,
        extra_hours: Decimal,
    ) {
        self.planned_start_date = Some(start);
        self.planned_end_date = Some(end);
        self.planned_labor_hours = Some(planned_hours);
        self.extra_labor_hours += extra_hours;
    }

    /// Set the execution-end stamp unless already present.
    pub(crate) fn stamp_completed(&mut self, at: Timestamp) {
        if self.completed_at.is_none() {
            self.completed_at = Some(at);
        }
    }

    pub(crate) fn set_settlement(&mut self, settlement: Settlement) {
        self.settlement = Some(settlement);
    }

    pub(crate) fn set_exit_reason(&mut self, reason: Option<String>) {
        self.exit_reason = reason;
    }

    /// Move to `to` and append the history entry.
    pub(crate) fn move_to(
        &mut self,
        to: Phase,
        action: TransitionAction,
        at: Timestamp,
        note: Option<String>,
    ) {
        self.history.push(PhaseTransitionRecord {
            from: self.status,
            to,
            action,
            at,
            note,
        });
        self.status = to;
    }
}

/// Whether `action` taken from `from` lands on `to`.
fn action_leads(action: TransitionAction, from: Phase, to: Phase) -> bool {
    match action {
        TransitionAction::Advance(edge) => edge.from_phase() == from && edge.to_phase() == to,
        TransitionAction::Finalize => {
            from.accepts_settlement() && to == Phase::PendingClosureAcceptance
        }
        TransitionAction::Cancel => !from.is_terminal() && to == Phase::Cancelled,
        TransitionAction::Reject => !from.is_terminal() && to == Phase::Rejected,
    }
}

fn non_negative(field: &'static str, value: Decimal) -> Result<(), LifecycleError> {
    if value < Decimal::ZERO {
        return Err(LifecycleError::input(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}
