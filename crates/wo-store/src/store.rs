//! # In-Memory Work-Order Store
//!
//! Thread-safe, cloneable store keyed by [`WorkOrderId`]. Writes are
//! compare-and-swap on [`WorkOrderRecord::version`]: a caller that loaded
//! version `n` can only write back if the stored record is still at `n`,
//! and a successful write bumps it to `n + 1`. This gives callers
//! at-most-one-transition-in-flight per work order without the engine
//! knowing anything about persistence.
//!
//! All operations are synchronous. The lock is `parking_lot::RwLock`, which
//! does not poison, and is never held across calls into the engine.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use wo_core::WorkOrderId;
use wo_state::WorkOrderRecord;

use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct WorkOrderStore {
    data: Arc<RwLock<HashMap<WorkOrderId, WorkOrderRecord>>>,
}

impl Clone for WorkOrderStore {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl WorkOrderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a newly opened record, assigning its identifier and version 1.
    ///
    /// Returns the stored copy.
    pub fn insert(&self, mut record: WorkOrderRecord) -> Result<WorkOrderRecord, StoreError> {
        if let Some(id) = record.id() {
            return Err(StoreError::Persistence(format!(
                "{id} already has an identifier; use compare_and_swap"
            )));
        }
        let id = WorkOrderId::new();
        record.mark_persisted(id, 1);
        self.data.write().insert(id, record.clone());
        Ok(record)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &WorkOrderId) -> Result<WorkOrderRecord, StoreError> {
        self.data
            .read()
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))
    }

    /// All records, ordered by cost center then number.
    pub fn list(&self) -> Vec<WorkOrderRecord> {
        let mut all: Vec<_> = self.data.read().values().cloned().collect();
        all.sort_by(|a, b| {
            (a.cost_center_id(), a.number()).cmp(&(b.cost_center_id(), b.number()))
        });
        all
    }

    /// Write `record` back if the stored version still equals
    /// `record.version()`. Returns the stored copy with the bumped version.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ConcurrentModification`] on a version mismatch.
    /// - [`StoreError::ImmutableField`] if the number or cost center differs
    ///   from the stored record.
    /// - [`StoreError::NotFound`] / [`StoreError::Persistence`] for unknown or
    ///   unpersisted records.
    pub fn compare_and_swap(
        &self,
        mut record: WorkOrderRecord,
    ) -> Result<WorkOrderRecord, StoreError> {
        let id = record.id().ok_or_else(|| {
            StoreError::Persistence(format!(
                "record {} has no identifier; use insert",
                record.number()
            ))
        })?;

        let mut guard = self.data.write();
        let current = guard.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if current.version() != record.version() {
            return Err(StoreError::ConcurrentModification {
                id,
                expected: record.version(),
                actual: current.version(),
            });
        }
        if current.number() != record.number() {
            return Err(StoreError::ImmutableField { id, field: "number" });
        }
        if current.cost_center_id() != record.cost_center_id() {
            return Err(StoreError::ImmutableField {
                id,
                field: "cost_center_id",
            });
        }

        let next_version = current.version() + 1;
        record.mark_persisted(id, next_version);
        *current = record.clone();
        Ok(record)
    }

    /// Replace the whole content, e.g. when loading a snapshot.
    ///
    /// Every record must carry an identifier, be unique, and pass
    /// [`WorkOrderRecord::check_invariants`]. Nothing is replaced on error.
    pub fn restore(
        &self,
        records: impl IntoIterator<Item = WorkOrderRecord>,
    ) -> Result<(), StoreError> {
        let mut map = HashMap::new();
        for record in records {
            let id = record.id().ok_or_else(|| {
                StoreError::Persistence(format!(
                    "snapshot record {} has no identifier",
                    record.number()
                ))
            })?;
            record.check_invariants().map_err(|e| {
                StoreError::Persistence(format!("snapshot record {}: {e}", record.number()))
            })?;
            if map.insert(id, record).is_some() {
                return Err(StoreError::Persistence(format!(
                    "duplicate identifier {id} in snapshot"
                )));
            }
        }
        *self.data.write() = map;
        Ok(())
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &WorkOrderId) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
