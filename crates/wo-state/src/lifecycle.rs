//! # Lifecycle Engine
//!
//! Applies one guarded operation to a [`WorkOrderRecord`] and returns the
//! updated copy. The caller's record is never touched: every operation
//! clones, validates, applies, and returns, so a failure leaves nothing
//! half-applied.
//!
//! The engine owns no store and no client. Its only collaborator is the
//! injected [`Clock`]; the [`NumberIssuer`] is passed to [`LifecycleEngine::open`]
//! per call.
//!
//! ## Operations
//!
//! | Operation | Valid from | Lands in |
//! |---|---|---|
//! | [`advance`](LifecycleEngine::advance) | source of the named [`Edge`] | its target |
//! | [`finalize`](LifecycleEngine::finalize) | `Executing`, `PendingClosureAcceptance` | `PendingClosureAcceptance` |
//! | [`cancel`](LifecycleEngine::cancel) / [`reject`](LifecycleEngine::reject) | any non-terminal phase | `Cancelled` / `Rejected` |
//! | [`amend_description`](LifecycleEngine::amend_description) | any non-terminal phase | unchanged |
//! | [`revise_budget`](LifecycleEngine::revise_budget) | `Open`, `Planning`, `PendingAcceptance` | unchanged |

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wo_core::{Clock, CostCenterId, SystemClock, WorkOrderNumber};

use crate::error::{IssuerError, LifecycleError};
use crate::phase::{Edge, Phase};
use crate::record::{OpenWorkOrderRequest, TransitionAction, WorkOrderRecord};
use crate::settlement::{SettlementCalculator, SettlementInput};

/// Numbering authority for new work orders.
///
/// Must return a number unique within `cost_center`. Implementations are
/// responsible for their own race freedom; the engine calls this exactly
/// once per successful [`LifecycleEngine::open`] and never retries.
pub trait NumberIssuer: Send + Sync {
    fn issue_number(&self, cost_center: CostCenterId) -> Result<WorkOrderNumber, IssuerError>;
}

impl<T: NumberIssuer + ?Sized> NumberIssuer for &T {
    fn issue_number(&self, cost_center: CostCenterId) -> Result<WorkOrderNumber, IssuerError> {
        (**self).issue_number(cost_center)
    }
}

/// The plan submitted on `Planning → PendingAcceptance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanInput {
    pub planned_start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    pub planned_labor_hours: Decimal,
    /// Hours on top of the plan; 0 when absent.
    #[serde(default)]
    pub extra_labor_hours: Option<Decimal>,
    /// Replaces the original budget when present.
    #[serde(default)]
    pub budget_amount: Option<Decimal>,
}

/// The caller's intent for [`LifecycleEngine::advance`]: an edge plus the
/// input that edge requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "edge")]
pub enum EdgeInput {
    StartPlanning,
    SubmitPlan(PlanInput),
    ApproveExecution,
    CompleteExecution,
    AcceptClosure,
}

impl EdgeInput {
    /// The edge this input names.
    pub fn edge(&self) -> Edge {
        match self {
            Self::StartPlanning => Edge::StartPlanning,
            Self::SubmitPlan(_) => Edge::SubmitPlan,
            Self::ApproveExecution => Edge::ApproveExecution,
            Self::CompleteExecution => Edge::CompleteExecution,
            Self::AcceptClosure => Edge::AcceptClosure,
        }
    }
}

/// Pure decision core for work-order lifecycles.
#[derive(Debug, Clone, Default)]
pub struct LifecycleEngine<C: Clock = SystemClock> {
    clock: C,
}

impl LifecycleEngine<SystemClock> {
    /// Engine reading wall-clock time.
    pub fn system() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> LifecycleEngine<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Create an `Open` record with a number from `issuer`.
    ///
    /// The request is validated before the issuer is called, so a rejected
    /// request never consumes a number.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidInput`] for a negative budget or blank
    ///   description / discipline.
    /// - [`LifecycleError::IssuerFailure`] when the issuer fails.
    pub fn open(
        &self,
        request: OpenWorkOrderRequest,
        issuer: &dyn NumberIssuer,
    ) -> Result<WorkOrderRecord, LifecycleError> {
        require_non_negative("budget_amount", request.budget_amount)?;
        require_text("description", &request.description)?;
        require_text("discipline", &request.discipline)?;
        require_text("requester_id", request.requester_id.as_str())?;
        require_text("responsible_engineer_id", request.responsible_engineer_id.as_str())?;

        let number = issuer.issue_number(request.cost_center_id)?;
        Ok(WorkOrderRecord::opened(request, number, self.clock.now()))
    }

    /// Take one forward edge.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`] when the record is terminal or
    ///   is not at the edge's source phase (this includes calling the same
    ///   edge twice).
    /// - [`LifecycleError::InvalidInput`] when the plan is invalid.
    pub fn advance(
        &self,
        record: &WorkOrderRecord,
        input: EdgeInput,
    ) -> Result<WorkOrderRecord, LifecycleError> {
        let edge = input.edge();
        let action = TransitionAction::Advance(edge);
        let from = record.status();
        if from.is_terminal() {
            return Err(LifecycleError::transition(from, action, "record is terminal"));
        }
        if edge.from_phase() != from {
            return Err(LifecycleError::transition(
                from,
                action,
                format!("{edge} leaves {}, not {from}", edge.from_phase()),
            ));
        }

        let now = self.clock.now();
        let mut next = record.clone();
        match input {
            EdgeInput::SubmitPlan(plan) => {
                let (start, end, planned, extra, budget) = validate_plan(&plan)?;
                if let Some(budget) = budget {
                    next.set_budget(budget);
                }
                next.apply_plan(start, end, planned, extra);
            }
            EdgeInput::CompleteExecution => next.stamp_completed(now),
            EdgeInput::StartPlanning | EdgeInput::ApproveExecution | EdgeInput::AcceptClosure => {}
        }
        next.move_to(edge.to_phase(), action, now, None);
        Ok(next)
    }

    /// Record the closing settlement and land in `PendingClosureAcceptance`.
    ///
    /// From `Executing` this also ends execution: `completed_at` is set to the
    /// delivery instant. From `PendingClosureAcceptance` the existing
    /// completion stamp is kept.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`] from any other phase, or when
    ///   the record is already settled.
    /// - [`LifecycleError::InvalidInput`] for negative costs.
    pub fn finalize(
        &self,
        record: &WorkOrderRecord,
        input: SettlementInput,
    ) -> Result<WorkOrderRecord, LifecycleError> {
        let action = TransitionAction::Finalize;
        let from = record.status();
        if !from.accepts_settlement() {
            return Err(LifecycleError::transition(
                from,
                action,
                "settlement requires EXECUTING or PENDING_CLOSURE_ACCEPTANCE",
            ));
        }
        if record.is_settled() {
            return Err(LifecycleError::transition(from, action, "record is already settled"));
        }

        let now = self.clock.now();
        let settlement = SettlementCalculator::compute(record.budget_amount(), &input, now)?;
        let delivered_at = settlement.actual_delivered_at;
        let note = settlement.close_justification.clone();

        let mut next = record.clone();
        next.stamp_completed(delivered_at);
        next.set_settlement(settlement);
        next.move_to(Phase::PendingClosureAcceptance, action, now, note);
        Ok(next)
    }

    /// Side exit to `Cancelled`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] when the record is terminal.
    pub fn cancel(
        &self,
        record: &WorkOrderRecord,
        reason: Option<String>,
    ) -> Result<WorkOrderRecord, LifecycleError> {
        self.exit(record, Phase::Cancelled, TransitionAction::Cancel, reason)
    }

    /// Side exit to `Rejected`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] when the record is terminal.
    pub fn reject(
        &self,
        record: &WorkOrderRecord,
        reason: Option<String>,
    ) -> Result<WorkOrderRecord, LifecycleError> {
        self.exit(record, Phase::Rejected, TransitionAction::Reject, reason)
    }

    /// Replace the description. Not allowed once terminal.
    pub fn amend_description(
        &self,
        record: &WorkOrderRecord,
        description: impl Into<String>,
    ) -> Result<WorkOrderRecord, LifecycleError> {
        let description = description.into();
        if record.is_terminal() {
            return Err(LifecycleError::input(
                "description",
                format!("record is {} and can no longer be edited", record.status()),
            ));
        }
        require_text("description", &description)?;
        let mut next = record.clone();
        next.set_description(description);
        Ok(next)
    }

    /// Revise the budget while planning is still open.
    pub fn revise_budget(
        &self,
        record: &WorkOrderRecord,
        amount: Decimal,
    ) -> Result<WorkOrderRecord, LifecycleError> {
        require_non_negative("budget_amount", amount)?;
        if !record.status().budget_open() {
            return Err(LifecycleError::input(
                "budget_amount",
                format!("budget is frozen once execution starts (record is {})", record.status()),
            ));
        }
        let mut next = record.clone();
        next.set_budget(amount);
        Ok(next)
    }

    fn exit(
        &self,
        record: &WorkOrderRecord,
        to: Phase,
        action: TransitionAction,
        reason: Option<String>,
    ) -> Result<WorkOrderRecord, LifecycleError> {
        let from = record.status();
        if from.is_terminal() {
            return Err(LifecycleError::transition(from, action, "record is terminal"));
        }
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let mut next = record.clone();
        next.set_exit_reason(reason.clone());
        next.move_to(to, action, self.clock.now(), reason);
        Ok(next)
    }
}

type ValidPlan = (NaiveDate, NaiveDate, Decimal, Decimal, Option<Decimal>);

fn validate_plan(plan: &PlanInput) -> Result<ValidPlan, LifecycleError> {
    if plan.planned_end_date < plan.planned_start_date {
        return Err(LifecycleError::input(
            "planned_end_date",
            format!(
                "{} is before planned start {}",
                plan.planned_end_date, plan.planned_start_date
            ),
        ));
    }
    require_non_negative("planned_labor_hours", plan.planned_labor_hours)?;
    let extra = plan.extra_labor_hours.unwrap_or(Decimal::ZERO);
    require_non_negative("extra_labor_hours", extra)?;
    if let Some(budget) = plan.budget_amount {
        require_non_negative("budget_amount", budget)?;
    }
    Ok((
        plan.planned_start_date,
        plan.planned_end_date,
        plan.planned_labor_hours,
        extra,
        plan.budget_amount,
    ))
}

fn require_non_negative(field: &'static str, value: Decimal) -> Result<(), LifecycleError> {
    if value < Decimal::ZERO {
        return Err(LifecycleError::input(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

fn require_text(field: &'static str, value: &str) -> Result<(), LifecycleError> {
    if value.trim().is_empty() {
        return Err(LifecycleError::input(field, "must not be blank"));
    }
    Ok(())
}
