//! Store configuration.
//!
//! Where the JSON snapshot lives, how wide issued sequence numbers are, and
//! how long an invocation waits for another one holding the snapshot lock.
//! Defaults suit a single operator working in the current directory.
//! Override via environment variables or explicit construction for tests.

use std::path::PathBuf;
use std::time::Duration;

/// Default snapshot path, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "work-orders.json";

/// Default zero-padded width of the per-cost-center sequence.
pub const DEFAULT_NUMBER_WIDTH: usize = 4;

/// Default wait for the snapshot lock, in milliseconds.
pub const DEFAULT_LOCK_WAIT_MS: u64 = 5_000;

/// Configuration for the snapshot-backed store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// JSON snapshot file.
    pub data_file: PathBuf,
    /// Digits in the sequence part of `"{cost_center}-{sequence}"`.
    pub number_width: usize,
    /// How long to wait for another holder of the snapshot lock.
    pub lock_wait: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            number_width: DEFAULT_NUMBER_WIDTH,
            lock_wait: Duration::from_millis(DEFAULT_LOCK_WAIT_MS),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `WO_DATA_FILE` (default: `work-orders.json`)
    /// - `WO_NUMBER_WIDTH` (default: 4, range 1–9)
    /// - `WO_LOCK_WAIT_MS` (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_file = lookup("WO_DATA_FILE")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let number_width = match lookup("WO_NUMBER_WIDTH") {
            None => DEFAULT_NUMBER_WIDTH,
            Some(raw) => parse_width(&raw)?,
        };

        let lock_wait = match lookup("WO_LOCK_WAIT_MS") {
            None => Duration::from_millis(DEFAULT_LOCK_WAIT_MS),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidLockWait(raw.to_string()))?,
        };

        Ok(Self {
            data_file,
            number_width,
            lock_wait,
        })
    }

    /// Same configuration with a different snapshot path.
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Same configuration with a different lock wait.
    pub fn with_lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = wait;
        self
    }
}

fn parse_width(raw: &str) -> Result<usize, ConfigError> {
    let width: usize = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumberWidth(raw.to_string()))?;
    if !(1..=9).contains(&width) {
        return Err(ConfigError::InvalidNumberWidth(raw.to_string()));
    }
    Ok(width)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("WO_NUMBER_WIDTH must be an integer between 1 and 9, got {0:?}")]
    InvalidNumberWidth(String),

    #[error("WO_LOCK_WAIT_MS must be a non-negative integer, got {0:?}")]
    InvalidLockWait(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, StoreConfig::default());
        assert_eq!(cfg.data_file, PathBuf::from("work-orders.json"));
        assert_eq!(cfg.number_width, 4);
        assert_eq!(cfg.lock_wait, Duration::from_secs(5));
    }

    #[test]
    fn overrides_apply() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            ("WO_DATA_FILE", "/var/lib/wo/orders.json"),
            ("WO_NUMBER_WIDTH", " 6 "),
            ("WO_LOCK_WAIT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(cfg.lock_wait, Duration::from_millis(250));
        assert_eq!(cfg.data_file, PathBuf::from("/var/lib/wo/orders.json"));
        assert_eq!(cfg.number_width, 6);
    }

    #[test]
    fn blank_data_file_falls_back() {
        let cfg = StoreConfig::from_lookup(lookup(&[("WO_DATA_FILE", "  ")])).unwrap();
        assert_eq!(cfg.data_file, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[test]
    fn width_out_of_range_rejected() {
        for bad in ["0", "10", "-1", "four", ""] {
            let err = StoreConfig::from_lookup(lookup(&[("WO_NUMBER_WIDTH", bad)])).unwrap_err();
            assert_eq!(err, ConfigError::InvalidNumberWidth(bad.to_string()));
        }
    }

    #[test]
    fn lock_wait_must_be_an_integer() {
        for bad in ["-1", "soon", "1.5"] {
            let err = StoreConfig::from_lookup(lookup(&[("WO_LOCK_WAIT_MS", bad)])).unwrap_err();
            assert_eq!(err, ConfigError::InvalidLockWait(bad.to_string()));
        }
    }
}
