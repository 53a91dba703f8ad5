//! # wo-store — Reference Collaborators for the Work-Order Engine
//!
//! The engine in `wo-state` is pure: it never touches storage or a
//! numbering authority on its own. This crate supplies working versions of
//! both, plus the service that wires them together.
//!
//! | Module        | Provides                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`store`]     | `WorkOrderStore`, in-memory with compare-and-swap writes |
//! | [`issuer`]    | `SequentialNumberIssuer`, `"{cost_center}-{seq}"` numbers |
//! | [`service`]   | `WorkOrderService`, load → engine → CAS with tracing      |
//! | [`snapshot`]  | JSON snapshot of records and issuer counters             |
//! | [`lock`]      | `SnapshotLock`, one writer per snapshot file at a time   |
//! | [`config`]    | `StoreConfig::from_env`                                  |
//! | [`error`]     | `StoreError`, `ServiceError`                             |

pub mod config;
pub mod error;
pub mod issuer;
pub mod lock;
pub mod service;
pub mod snapshot;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use error::{ServiceError, StoreError};
pub use issuer::SequentialNumberIssuer;
pub use lock::SnapshotLock;
pub use service::WorkOrderService;
pub use snapshot::Snapshot;
pub use store::WorkOrderStore;
