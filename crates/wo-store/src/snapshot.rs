//! JSON snapshot of the store and issuer counters.
//!
//! The CLI loads a snapshot at startup and commits one after every
//! mutating command. Each commit bumps `generation`; committing over a file
//! whose generation moved since the load is refused, so a writer that
//! bypassed [`crate::SnapshotLock`] cannot be silently overwritten. Bytes
//! go to a temp file in the target directory, are synced, and the temp
//! file is renamed over the target, so a crash mid-write leaves the
//! previous snapshot intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use wo_state::WorkOrderRecord;

use crate::error::StoreError;

/// Snapshot format version written by this crate.
pub const SNAPSHOT_FORMAT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format: u32,
    /// Number of commits that produced this file. Zero for a fresh store.
    #[serde(default)]
    pub generation: u64,
    /// Last sequence issued per cost center.
    #[serde(default)]
    pub counters: BTreeMap<i64, u64>,
    #[serde(default)]
    pub records: Vec<WorkOrderRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            generation: 0,
            counters: BTreeMap::new(),
            records: Vec::new(),
        }
    }
}

impl Snapshot {
    /// Load from `path`. A missing file is an empty snapshot.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(snapshot_error(path, e)),
        };
        let snapshot: Self = serde_json::from_str(&raw).map_err(|e| snapshot_error(path, e))?;
        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(StoreError::Snapshot {
                path: path.display().to_string(),
                reason: format!(
                    "unsupported snapshot format {} (expected {SNAPSHOT_FORMAT})",
                    snapshot.format
                ),
            });
        }
        Ok(snapshot)
    }

    /// Write this snapshot as the successor of generation `loaded`.
    ///
    /// # Errors
    ///
    /// [`StoreError::StaleSnapshot`] when the file on disk is no longer at
    /// `loaded`; nothing is written in that case.
    pub fn commit(&mut self, path: &Path, loaded: u64) -> Result<(), StoreError> {
        let actual = Self::load(path)?.generation;
        if actual != loaded {
            return Err(StoreError::StaleSnapshot {
                path: path.display().to_string(),
                expected: loaded,
                actual,
            });
        }
        self.generation = loaded + 1;
        self.save(path)
    }

    /// Write to `path` via a synced temp file and rename, unconditionally.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent,
            None => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| snapshot_error(path, e))?;
        let body = serde_json::to_vec_pretty(self).map_err(|e| snapshot_error(path, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| snapshot_error(path, e))?;
        tmp.write_all(&body).map_err(|e| snapshot_error(path, e))?;
        tmp.as_file().sync_all().map_err(|e| snapshot_error(path, e))?;
        tmp.persist(path).map_err(|e| snapshot_error(path, e.error))?;
        Ok(())
    }
}

fn snapshot_error(path: &Path, e: impl std::fmt::Display) -> StoreError {
    StoreError::Snapshot {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
