//! # Snapshot-Backed Workspace
//!
//! One CLI invocation = lock, load snapshot, run one command, commit
//! snapshot. The workspace owns the store, the issuer, and the snapshot
//! lock for the duration of the command, so overlapping invocations never
//! issue from the same counters or overwrite each other's records.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use wo_core::Clock;
use wo_state::LifecycleEngine;
use wo_store::{
    SequentialNumberIssuer, Snapshot, SnapshotLock, StoreConfig, WorkOrderService, WorkOrderStore,
};

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    generation: u64,
    store: WorkOrderStore,
    issuer: Arc<SequentialNumberIssuer>,
    _lock: SnapshotLock,
}

impl Workspace {
    /// Lock and load the snapshot named by `config`. A missing file starts
    /// empty. The lock is held until the workspace is dropped.
    pub fn load(config: &StoreConfig) -> Result<Self> {
        let lock = SnapshotLock::acquire(&config.data_file, config.lock_wait)?;
        let snapshot = Snapshot::load(&config.data_file)?;
        let store = WorkOrderStore::new();
        store
            .restore(snapshot.records)
            .with_context(|| format!("failed to restore {}", config.data_file.display()))?;
        let issuer = Arc::new(SequentialNumberIssuer::with_counters(
            config.number_width,
            snapshot.counters,
        ));
        tracing::debug!(
            data_file = %config.data_file.display(),
            generation = snapshot.generation,
            records = store.len(),
            "workspace loaded"
        );
        Ok(Self {
            path: config.data_file.clone(),
            generation: snapshot.generation,
            store,
            issuer,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A service over this workspace's store and issuer.
    pub fn service<C: Clock>(&self, clock: C) -> WorkOrderService<C> {
        WorkOrderService::new(
            LifecycleEngine::new(clock),
            self.store.clone(),
            self.issuer.clone(),
        )
    }

    /// Generation of the snapshot this workspace was loaded from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Write records and issuer counters back to disk.
    pub fn save(&mut self) -> Result<()> {
        let mut snapshot = Snapshot {
            counters: self.issuer.counters(),
            records: self.store.list(),
            ..Snapshot::default()
        };
        snapshot.commit(&self.path, self.generation)?;
        self.generation = snapshot.generation;
        tracing::debug!(
            data_file = %self.path.display(),
            generation = snapshot.generation,
            records = snapshot.records.len(),
            "workspace saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal_macros::dec;
    use wo_core::{CostCenterId, FixedClock, Timestamp, UserId};
    use wo_state::OpenWorkOrderRequest;

    use super::*;

    fn clock() -> FixedClock {
        FixedClock::at(Timestamp::from_ymd(2025, 2, 1).unwrap())
    }

    fn request() -> OpenWorkOrderRequest {
        OpenWorkOrderRequest {
            cost_center_id: CostCenterId(12),
            discipline: "Civil".into(),
            involved_disciplines: Default::default(),
            description: "Culvert".into(),
            budget_amount: dec!(1000),
            requester_id: UserId::new("ana"),
            responsible_engineer_id: UserId::new("bruno"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn second_workspace_waits_for_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::default()
            .with_data_file(dir.path().join("orders.json"))
            .with_lock_wait(Duration::ZERO);

        let mut first = Workspace::load(&config).unwrap();
        let err = Workspace::load(&config).unwrap_err();
        assert!(err.to_string().contains("locked"), "{err}");

        let a = first.service(clock()).open(request()).unwrap();
        first.save().unwrap();
        drop(first);

        let mut second = Workspace::load(&config).unwrap();
        assert_eq!(second.generation(), 1);
        let b = second.service(clock()).open(request()).unwrap();
        second.save().unwrap();

        assert_eq!(a.number().as_str(), "12-0001");
        assert_eq!(b.number().as_str(), "12-0002");
        let snapshot = Snapshot::load(&config.data_file).unwrap();
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.generation, 2);
    }

    #[test]
    fn save_refuses_a_file_rewritten_behind_its_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::default().with_data_file(dir.path().join("orders.json"));

        let mut workspace = Workspace::load(&config).unwrap();
        workspace.service(clock()).open(request()).unwrap();
        let mut foreign = Snapshot::default();
        foreign.commit(&config.data_file, 0).unwrap();

        let err = workspace.save().unwrap_err();
        assert!(err.to_string().contains("changed on disk"), "{err}");
        assert_eq!(Snapshot::load(&config.data_file).unwrap(), foreign);
    }
}
