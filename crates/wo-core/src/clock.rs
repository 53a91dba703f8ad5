//! # Clock Abstraction
//!
//! Source of "now" for `opened_at`, the execution-end stamp and the
//! default delivery date. Production code injects [`SystemClock`]; tests
//! inject a [`FixedClock`] for deterministic stamps.

use std::fmt;

use crate::temporal::Timestamp;

/// Abstraction over time sources.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant, UTC, seconds precision.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl FixedClock {
    pub fn at(ts: Timestamp) -> Self {
        Self(ts)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
