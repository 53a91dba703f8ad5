//! # wo-core — Foundational Types for the Work-Order Engine
//!
//! This crate is the leaf of the workspace DAG. It defines the primitives
//! every other crate shares: identifier newtypes, UTC-only timestamps, the
//! `MM/YYYY` accounting period, and the injectable [`Clock`].
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `WorkOrderId`,
//!    `CostCenterId`, `WorkOrderNumber`, `UserId` cannot be confused for one
//!    another or for bare strings.
//!
//! 2. **UTC-only timestamps.** [`Timestamp`] is always UTC, seconds precision.
//!
//! 3. **Time is injected.** Nothing in the engine calls `Utc::now()`
//!    directly; callers pass a [`Clock`], so tests pin "now".
//!
//! ## Crate Policy
//!
//! - No dependencies on other `wo-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod clock;
pub mod error;
pub mod identity;
pub mod period;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::WoError;
pub use identity::{CostCenterId, UserId, WorkOrderId, WorkOrderNumber};
pub use period::AccountingPeriod;
pub use temporal::Timestamp;
