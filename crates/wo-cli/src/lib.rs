//! # wo-cli — Work-Order Operator CLI
//!
//! Provides the `wo` command-line interface over a JSON snapshot of the
//! work-order store.
//!
//! ```bash
//! wo open --cost-center 12 --discipline Civil --description "Retaining wall" \
//!     --budget 50000 --requester ana --engineer bruno
//! wo advance <id> start-planning
//! wo advance <id> submit-plan --start 2025-02-03 --end 2025-02-20 --planned-hours 120
//! wo finalize <id> --engineering-cost 42000 --procurement-cost 39000 --delivered-on 2025-02-20
//! wo list
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in [`commands`]; lifecycle decisions stay in
//!   `wo-state` and persistence in `wo-store`.
//! - Read-only commands never rewrite the snapshot.
//! - Each invocation holds the snapshot lock from load to save.

pub mod commands;
pub mod workspace;

use anyhow::Result;

use wo_core::Clock;
use wo_store::StoreConfig;

use crate::commands::{run_command, Command};
use crate::workspace::Workspace;

/// Load the snapshot, run one command, and save if it mutated anything.
pub fn execute<C: Clock>(config: &StoreConfig, command: &Command, clock: C) -> Result<u8> {
    let mut workspace = Workspace::load(config)?;
    let code = run_command(command, &workspace.service(clock))?;
    if command.mutates() {
        workspace.save()?;
    }
    Ok(code)
}
