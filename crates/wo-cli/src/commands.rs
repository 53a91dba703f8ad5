//! # Work-Order Subcommands
//!
//! Each handler parses its flags into engine inputs, calls the service, and
//! prints a short report. Handlers return the process exit code; any error
//! bubbles up to `main` as `anyhow::Error`.
//!
//! ## Subcommands
//!
//! - `open`: Create a work order in OPEN.
//! - `show`: Print one work order with its transition history.
//! - `list`: One line per work order.
//! - `advance`: Take a forward edge (plan flags for `submit-plan`).
//! - `finalize`: Book the settlement (EXECUTING / PENDING_CLOSURE_ACCEPTANCE).
//! - `cancel`, `reject`: Side exits.
//! - `amend`, `revise-budget`: Non-transition edits.
//! - `preview-settlement`: Settlement figures without writing anything.

use std::collections::BTreeSet;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use rust_decimal::Decimal;
use serde::Serialize;

use wo_core::{Clock, CostCenterId, Timestamp, UserId, WorkOrderId};
use wo_state::{
    Edge, EdgeInput, OpenWorkOrderRequest, PlanInput, SettlementCalculator, SettlementInput,
    WorkOrderRecord,
};
use wo_store::WorkOrderService;

/// Work-order subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open a new work order.
    Open {
        /// Cost center the work is charged to.
        #[arg(long)]
        cost_center: i64,
        /// Lead discipline (e.g. "Civil").
        #[arg(long)]
        discipline: String,
        /// Other disciplines involved; repeatable.
        #[arg(long = "involved")]
        involved: Vec<String>,
        #[arg(long)]
        description: String,
        #[arg(long)]
        budget: Decimal,
        #[arg(long)]
        requester: String,
        /// Responsible engineer.
        #[arg(long)]
        engineer: String,
    },

    /// Show one work order.
    Show {
        id: WorkOrderId,
        /// Print the full record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List all work orders.
    List {
        #[arg(long)]
        json: bool,
    },

    /// Take one forward edge: start-planning, submit-plan, approve-execution,
    /// complete-execution, accept-closure.
    Advance {
        id: WorkOrderId,
        #[arg(value_parser = parse_edge)]
        edge: Edge,
        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Book the closing settlement.
    Finalize {
        id: WorkOrderId,
        #[command(flatten)]
        costs: CostArgs,
        #[arg(long)]
        justification: Option<String>,
    },

    /// Cancel a work order.
    Cancel {
        id: WorkOrderId,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Reject a work order.
    Reject {
        id: WorkOrderId,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Replace the description.
    Amend {
        id: WorkOrderId,
        #[arg(long)]
        description: String,
    },

    /// Revise the budget (OPEN, PLANNING, PENDING_ACCEPTANCE only).
    ReviseBudget {
        id: WorkOrderId,
        #[arg(long)]
        amount: Decimal,
    },

    /// Compute settlement figures without writing. Takes either a stored
    /// work order or a bare budget.
    PreviewSettlement {
        #[arg(long, conflicts_with = "budget", required_unless_present = "budget")]
        id: Option<WorkOrderId>,
        #[arg(long)]
        budget: Option<Decimal>,
        #[command(flatten)]
        costs: CostArgs,
    },
}

/// Plan flags for `advance <id> submit-plan`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PlanArgs {
    /// Planned start date (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Planned end date (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub planned_hours: Option<Decimal>,
    #[arg(long)]
    pub extra_hours: Option<Decimal>,
    /// Replaces the original budget.
    #[arg(long = "plan-budget")]
    pub budget: Option<Decimal>,
}

/// Cost flags shared by `finalize` and `preview-settlement`.
#[derive(clap::Args, Debug, Clone)]
pub struct CostArgs {
    #[arg(long)]
    pub engineering_cost: Decimal,
    #[arg(long)]
    pub procurement_cost: Decimal,
    /// Delivery date or RFC 3339 instant; defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub delivered_on: Option<Timestamp>,
}

impl Command {
    /// Whether the command changes the snapshot.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Self::Show { .. } | Self::List { .. } | Self::PreviewSettlement { .. }
        )
    }
}

/// Execute `command` against `service`.
pub fn run_command<C: Clock>(command: &Command, service: &WorkOrderService<C>) -> Result<u8> {
    match command {
        Command::Open {
            cost_center,
            discipline,
            involved,
            description,
            budget,
            requester,
            engineer,
        } => {
            let record = service.open(OpenWorkOrderRequest {
                cost_center_id: CostCenterId(*cost_center),
                discipline: discipline.clone(),
                involved_disciplines: involved.iter().cloned().collect::<BTreeSet<_>>(),
                description: description.clone(),
                budget_amount: *budget,
                requester_id: UserId::new(requester.as_str()),
                responsible_engineer_id: UserId::new(engineer.as_str()),
            })?;
            println!(
                "OK: opened {} ({}) in {}",
                record.number(),
                stored_id(&record)?,
                record.status()
            );
            Ok(0)
        }

        Command::Show { id, json } => {
            let record = service.get(id)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
            Ok(0)
        }

        Command::List { json } => {
            let rows: Vec<ListRow> = service.list().iter().map(ListRow::from).collect();
            if *json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No work orders found.");
            } else {
                println!("Work orders ({}):", rows.len());
                for row in &rows {
                    println!("  {}  {}  {}  {}", row.number, row.status, row.id, row.description);
                }
            }
            Ok(0)
        }

        Command::Advance { id, edge, plan } => {
            let input = edge_input(*edge, plan)?;
            let from = service.get(id)?.status();
            let record = service.advance(id, input)?;
            println!(
                "OK: {} transitioned {from} → {} via {edge}",
                record.number(),
                record.status()
            );
            Ok(0)
        }

        Command::Finalize {
            id,
            costs,
            justification,
        } => {
            let mut input = settlement_input(costs);
            input.justification = justification.clone();
            let record = service.finalize(id, input)?;
            let settlement = record
                .settlement()
                .context("finalized work order carries no settlement")?;
            println!(
                "OK: {} settled: final cost {}, savings {}%, period {}",
                record.number(),
                settlement.final_cost,
                SettlementCalculator::display_savings(settlement.savings_percent),
                settlement.accounting_period
            );
            Ok(0)
        }

        Command::Cancel { id, reason } => {
            let record = service.cancel(id, reason.clone())?;
            println!("OK: {} {}", record.number(), record.status());
            Ok(0)
        }

        Command::Reject { id, reason } => {
            let record = service.reject(id, reason.clone())?;
            println!("OK: {} {}", record.number(), record.status());
            Ok(0)
        }

        Command::Amend { id, description } => {
            let record = service.amend_description(id, description.as_str())?;
            println!("OK: {} description updated", record.number());
            Ok(0)
        }

        Command::ReviseBudget { id, amount } => {
            let record = service.revise_budget(id, *amount)?;
            println!("OK: {} budget is now {}", record.number(), record.budget_amount());
            Ok(0)
        }

        Command::PreviewSettlement { id, budget, costs } => {
            let input = settlement_input(costs);
            let settlement = match (id, budget) {
                (Some(id), _) => service.preview_settlement(id, &input)?,
                (None, Some(budget)) => {
                    SettlementCalculator::compute(*budget, &input, service.engine().clock().now())?
                }
                (None, None) => bail!("preview-settlement needs --id or --budget"),
            };
            println!("{}", serde_json::to_string_pretty(&settlement)?);
            Ok(0)
        }
    }
}

/// Build the engine input for `edge`. Plan flags are only accepted with
/// `submit-plan`, where start, end, and planned hours are required.
pub fn edge_input(edge: Edge, plan: &PlanArgs) -> Result<EdgeInput> {
    let has_plan_flags = plan.start.is_some()
        || plan.end.is_some()
        || plan.planned_hours.is_some()
        || plan.extra_hours.is_some()
        || plan.budget.is_some();

    Ok(match edge {
        Edge::SubmitPlan => EdgeInput::SubmitPlan(PlanInput {
            planned_start_date: plan.start.context("submit-plan requires --start")?,
            planned_end_date: plan.end.context("submit-plan requires --end")?,
            planned_labor_hours: plan
                .planned_hours
                .context("submit-plan requires --planned-hours")?,
            extra_labor_hours: plan.extra_hours,
            budget_amount: plan.budget,
        }),
        other if has_plan_flags => bail!("plan flags are only valid with submit-plan, not {other}"),
        Edge::StartPlanning => EdgeInput::StartPlanning,
        Edge::ApproveExecution => EdgeInput::ApproveExecution,
        Edge::CompleteExecution => EdgeInput::CompleteExecution,
        Edge::AcceptClosure => EdgeInput::AcceptClosure,
    })
}

fn settlement_input(costs: &CostArgs) -> SettlementInput {
    let input = SettlementInput::new(costs.engineering_cost, costs.procurement_cost);
    match costs.delivered_on {
        Some(at) => input.delivered_at(at),
        None => input,
    }
}

fn parse_edge(raw: &str) -> Result<Edge, String> {
    Edge::from_name(raw).ok_or_else(|| {
        let names: Vec<_> = Edge::ALL.iter().map(|e| e.as_str()).collect();
        format!("unknown edge {raw:?} (expected one of {})", names.join(", "))
    })
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, String> {
    Timestamp::parse(raw).map_err(|e| e.to_string())
}

fn stored_id(record: &WorkOrderRecord) -> Result<WorkOrderId> {
    record.id().context("work order was not persisted")
}

#[derive(Debug, Serialize)]
struct ListRow {
    id: String,
    number: String,
    status: String,
    description: String,
}

impl From<&WorkOrderRecord> for ListRow {
    fn from(record: &WorkOrderRecord) -> Self {
        Self {
            id: record.id().map(|id| id.to_string()).unwrap_or_default(),
            number: record.number().to_string(),
            status: record.status().to_string(),
            description: record.description().to_string(),
        }
    }
}

fn print_record(record: &WorkOrderRecord) {
    println!("Work order: {}", record.number());
    if let Some(id) = record.id() {
        println!("  Id: {id}");
    }
    println!("  Status: {}", record.status());
    println!("  Cost center: {}", record.cost_center_id());
    println!("  Discipline: {}", record.discipline());
    if !record.involved_disciplines().is_empty() {
        let involved: Vec<_> = record.involved_disciplines().iter().map(String::as_str).collect();
        println!("  Involved: {}", involved.join(", "));
    }
    println!("  Description: {}", record.description());
    println!("  Budget: {}", record.budget_amount());
    if let (Some(start), Some(end)) = (record.planned_start_date(), record.planned_end_date()) {
        println!("  Planned: {start} .. {end}");
    }
    if let Some(hours) = record.planned_labor_hours() {
        println!(
            "  Labor hours: {hours} planned + {} extra = {}",
            record.extra_labor_hours(),
            record.total_labor_hours()
        );
    }
    println!("  Opened: {}", record.opened_at());
    if let Some(at) = record.completed_at() {
        println!("  Completed: {at}");
    }
    if let Some(s) = record.settlement() {
        println!(
            "  Settlement: engineering {}, procurement {}, final {}, savings {}%, period {}",
            s.engineering_cost,
            s.procurement_cost,
            s.final_cost,
            SettlementCalculator::display_savings(s.savings_percent),
            s.accounting_period
        );
    }
    if let Some(reason) = record.exit_reason() {
        println!("  Exit reason: {reason}");
    }
    println!("  Version: {}", record.version());
    println!("  Transitions: {}", record.history().len());
    for (i, t) in record.history().iter().enumerate() {
        println!("    [{i}] {} → {} via {} at {}", t.from, t.to, t.action, t.at);
    }
}
