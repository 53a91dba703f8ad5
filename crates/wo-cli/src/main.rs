//! # wo CLI entry point
//!
//! Parses command-line arguments, resolves the store configuration, and
//! dispatches to the command handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wo_core::SystemClock;
use wo_store::StoreConfig;

use wo_cli::commands::Command;

/// Engineering work orders: open, plan, execute, settle, close.
#[derive(Parser, Debug)]
#[command(name = "wo", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON snapshot file. Overrides `WO_DATA_FILE`.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(2);
        }
    };
    let config = match cli.data {
        Some(path) => config.with_data_file(path),
        None => config,
    };
    tracing::debug!(data_file = %config.data_file.display(), "wo starting");

    match wo_cli::execute(&config, &cli.command, SystemClock) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins when set; otherwise verbosity picks the level.
/// `WO_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let json = std::env::var("WO_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
