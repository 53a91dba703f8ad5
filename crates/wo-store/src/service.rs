//! # Work-Order Service
//!
//! The caller-side glue around the pure engine. Every mutating operation
//! follows the same shape:
//!
//! ```text
//! load (store.get) ──▶ decide (engine) ──▶ write (store.compare_and_swap)
//! ```
//!
//! The write is rejected if another caller landed first, and the
//! [`StoreError::ConcurrentModification`] is surfaced unchanged. No retry
//! happens here: whether a lost race should be retried depends on the
//! caller's intent.

use std::sync::Arc;

use tracing::{debug, info, warn};

use wo_core::{Clock, SystemClock, WorkOrderId};
use wo_state::{
    EdgeInput, LifecycleEngine, LifecycleError, NumberIssuer, OpenWorkOrderRequest, Settlement,
    SettlementCalculator, SettlementInput, WorkOrderRecord,
};

use crate::error::{ServiceError, StoreError};
use crate::store::WorkOrderStore;

pub struct WorkOrderService<C: Clock = SystemClock> {
    engine: LifecycleEngine<C>,
    store: WorkOrderStore,
    issuer: Arc<dyn NumberIssuer>,
}

impl<C: Clock> std::fmt::Debug for WorkOrderService<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkOrderService")
            .field("engine", &self.engine)
            .field("records", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl<C: Clock> WorkOrderService<C> {
    pub fn new(
        engine: LifecycleEngine<C>,
        store: WorkOrderStore,
        issuer: Arc<dyn NumberIssuer>,
    ) -> Self {
        Self {
            engine,
            store,
            issuer,
        }
    }

    pub fn engine(&self) -> &LifecycleEngine<C> {
        &self.engine
    }

    pub fn store(&self) -> &WorkOrderStore {
        &self.store
    }

    /// Validate, number, and persist a new work order.
    pub fn open(&self, request: OpenWorkOrderRequest) -> Result<WorkOrderRecord, ServiceError> {
        let cost_center = request.cost_center_id;
        let record = self.engine.open(request, self.issuer.as_ref()).map_err(|e| {
            warn!(cost_center = %cost_center, error = %e, "work order creation refused");
            e
        })?;
        let stored = self.store.insert(record)?;
        info!(
            work_order = ?stored.id(),
            number = %stored.number(),
            cost_center = %cost_center,
            version = stored.version(),
            "work order opened"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &WorkOrderId) -> Result<WorkOrderRecord, ServiceError> {
        Ok(self.store.get(id)?)
    }

    pub fn list(&self) -> Vec<WorkOrderRecord> {
        self.store.list()
    }

    /// Take one forward edge.
    pub fn advance(
        &self,
        id: &WorkOrderId,
        input: EdgeInput,
    ) -> Result<WorkOrderRecord, ServiceError> {
        self.transact(id, |engine, record| engine.advance(record, input))
    }

    /// Book the settlement and move to `PendingClosureAcceptance`.
    pub fn finalize(
        &self,
        id: &WorkOrderId,
        input: SettlementInput,
    ) -> Result<WorkOrderRecord, ServiceError> {
        self.transact(id, |engine, record| engine.finalize(record, input))
    }

    pub fn cancel(
        &self,
        id: &WorkOrderId,
        reason: Option<String>,
    ) -> Result<WorkOrderRecord, ServiceError> {
        self.transact(id, |engine, record| engine.cancel(record, reason))
    }

    pub fn reject(
        &self,
        id: &WorkOrderId,
        reason: Option<String>,
    ) -> Result<WorkOrderRecord, ServiceError> {
        self.transact(id, |engine, record| engine.reject(record, reason))
    }

    pub fn amend_description(
        &self,
        id: &WorkOrderId,
        description: impl Into<String>,
    ) -> Result<WorkOrderRecord, ServiceError> {
        let description = description.into();
        self.transact(id, |engine, record| engine.amend_description(record, description))
    }

    pub fn revise_budget(
        &self,
        id: &WorkOrderId,
        amount: rust_decimal::Decimal,
    ) -> Result<WorkOrderRecord, ServiceError> {
        self.transact(id, |engine, record| engine.revise_budget(record, amount))
    }

    /// Settlement figures the work order would book, without writing.
    pub fn preview_settlement(
        &self,
        id: &WorkOrderId,
        input: &SettlementInput,
    ) -> Result<Settlement, ServiceError> {
        let record = self.store.get(id)?;
        let now = self.engine.clock().now();
        let settlement = SettlementCalculator::compute(record.budget_amount(), input, now)?;
        debug!(
            work_order = %id,
            savings_percent = %settlement.savings_percent,
            period = %settlement.accounting_period,
            "settlement previewed"
        );
        Ok(settlement)
    }

    fn transact(
        &self,
        id: &WorkOrderId,
        decide: impl FnOnce(
            &LifecycleEngine<C>,
            &WorkOrderRecord,
        ) -> Result<WorkOrderRecord, LifecycleError>,
    ) -> Result<WorkOrderRecord, ServiceError> {
        let current = self.store.get(id)?;
        let next = decide(&self.engine, &current).map_err(|e| {
            debug!(work_order = %id, from = %current.status(), error = %e, "engine refused");
            e
        })?;
        let stored = self.store.compare_and_swap(next).map_err(|e| {
            if let StoreError::ConcurrentModification { expected, actual, .. } = &e {
                warn!(work_order = %id, expected, actual, "lost concurrent update");
            }
            e
        })?;
        info!(
            work_order = %id,
            number = %stored.number(),
            from = %current.status(),
            to = %stored.status(),
            version = stored.version(),
            "work order updated"
        );
        Ok(stored)
    }
}
