//! # Serde Fidelity of Persisted Types
//!
//! Records, settlements, and snapshots must survive a JSON round-trip
//! without losing precision: decimals travel as strings, instants as
//! RFC 3339 `Z`, phases and actions by their stable names.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use wo_core::{
    AccountingPeriod, CostCenterId, FixedClock, Timestamp, UserId, WorkOrderId, WorkOrderNumber,
};
use wo_state::{
    Edge, EdgeInput, IssuerError, LifecycleEngine, NumberIssuer, OpenWorkOrderRequest, PlanInput,
    SettlementInput, TransitionAction, WorkOrderRecord,
};
use wo_store::Snapshot;

struct Fixed;

impl NumberIssuer for Fixed {
    fn issue_number(&self, _: CostCenterId) -> Result<WorkOrderNumber, IssuerError> {
        WorkOrderNumber::new("5-0007").map_err(|e| IssuerError::Unavailable(e.to_string()))
    }
}

fn settled_record() -> WorkOrderRecord {
    let engine = LifecycleEngine::new(FixedClock::at(Timestamp::from_ymd(2025, 1, 2).unwrap()));
    let mut record = engine
        .open(
            OpenWorkOrderRequest {
                cost_center_id: CostCenterId(5),
                discipline: "Electrical".into(),
                involved_disciplines: ["Civil".to_string()].into(),
                description: "Substation feeder".into(),
                budget_amount: dec!(3),
                requester_id: UserId::new("ana"),
                responsible_engineer_id: UserId::new("bruno"),
            },
            &Fixed,
        )
        .unwrap();
    record.mark_persisted(WorkOrderId::new(), 1);
    let record = engine.advance(&record, EdgeInput::StartPlanning).unwrap();
    let record = engine
        .advance(
            &record,
            EdgeInput::SubmitPlan(PlanInput {
                planned_start_date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
                planned_end_date: NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
                planned_labor_hours: dec!(12.5),
                extra_labor_hours: Some(dec!(0.25)),
                budget_amount: None,
            }),
        )
        .unwrap();
    let record = engine.advance(&record, EdgeInput::ApproveExecution).unwrap();
    engine
        .finalize(
            &record,
            SettlementInput::new(dec!(2.10), dec!(2))
                .delivered_at(Timestamp::from_ymd(2025, 1, 28).unwrap())
                .justification("reused cable trays"),
        )
        .unwrap()
}

#[test]
fn record_round_trip() {
    let record = settled_record();
    let json = serde_json::to_string(&record).unwrap();
    let back: WorkOrderRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn record_wire_shape() {
    let value: Value = serde_json::to_value(settled_record()).unwrap();
    assert_eq!(value["status"], "PENDING_CLOSURE_ACCEPTANCE");
    assert_eq!(value["number"], "5-0007");
    assert_eq!(value["budget_amount"], "3");
    assert_eq!(value["planned_labor_hours"], "12.5");
    assert_eq!(value["extra_labor_hours"], "0.25");
    assert_eq!(value["planned_start_date"], "2025-01-03");
    assert_eq!(value["opened_at"], "2025-01-02T00:00:00Z");
    assert_eq!(value["completed_at"], "2025-01-28T00:00:00Z");
    let savings = value["settlement"]["savings_percent"].as_str().unwrap();
    assert!(savings.starts_with("33.3333333"), "savings lost precision: {savings}");
    assert_eq!(value["settlement"]["accounting_period"], "01/2025");
    assert_eq!(value["settlement"]["final_cost"], "2");
    assert_eq!(value["history"][0]["action"], json!({"kind": "ADVANCE", "edge": "START_PLANNING"}));
    assert_eq!(value["history"][3]["action"], json!({"kind": "FINALIZE"}));
}

#[test]
fn transition_action_round_trip() {
    for action in Edge::ALL
        .into_iter()
        .map(TransitionAction::Advance)
        .chain([TransitionAction::Finalize, TransitionAction::Cancel, TransitionAction::Reject])
    {
        let json = serde_json::to_string(&action).unwrap();
        let back: TransitionAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}

#[test]
fn edge_input_from_json() {
    let input: EdgeInput = serde_json::from_value(json!({
        "edge": "SUBMIT_PLAN",
        "planned_start_date": "2025-01-01",
        "planned_end_date": "2025-03-01",
        "planned_labor_hours": "200"
    }))
    .unwrap();
    match input {
        EdgeInput::SubmitPlan(plan) => {
            assert_eq!(plan.planned_labor_hours, dec!(200));
            assert_eq!(plan.extra_labor_hours, None);
        }
        other => panic!("expected SUBMIT_PLAN, got {other:?}"),
    }

    let input: EdgeInput = serde_json::from_value(json!({"edge": "ACCEPT_CLOSURE"})).unwrap();
    assert_eq!(input, EdgeInput::AcceptClosure);
}

#[test]
fn accounting_period_is_a_string() {
    let period = AccountingPeriod::new(2, 2025).unwrap();
    assert_eq!(serde_json::to_value(period).unwrap(), "02/2025");
    assert!(serde_json::from_value::<AccountingPeriod>(json!("13/2025")).is_err());
    assert!(serde_json::from_value::<AccountingPeriod>(json!("2/2025")).is_err());
}

#[test]
fn snapshot_round_trip() {
    let snapshot = Snapshot {
        counters: BTreeMap::from([(5, 7)]),
        records: vec![settled_record()],
        ..Snapshot::default()
    };
    let json = serde_json::to_string_pretty(&snapshot).unwrap();
    let back: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}
