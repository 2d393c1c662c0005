//! CLI module for simrun
//!
//! ## Options
//!
//! - `--simulator <iverilog|verilator|both>` - Toolchains to run (default: both)
//! - `--work-dir <DIR>` - Directory for compiled simulations (default: sim)
//! - `--report <FILE>` - JSON report path (default: simulation_report.json)
//! - `--root <DIR>` - Project root holding the RTL and testbenches (default: .)
//! - `--timeout <SECS>` - Per-command timeout (default: 300)
//! - `-v, --verbose` - Debug logging
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_REPORT_PATH, DEFAULT_TIMEOUT_SECS, DEFAULT_WORK_DIR, RunnerConfig, SimulatorSelection};
use crate::version::SIMRUN_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// FPGA Trading System Simulation Runner
#[derive(Parser, Debug)]
#[command(name = "simrun")]
#[command(version = SIMRUN_VERSION)]
#[command(about = "FPGA Trading System Simulation Runner", long_about = None)]
pub struct Cli {
    /// Simulator to use
    #[arg(long, value_enum, default_value_t = SimulatorSelection::Both)]
    pub simulator: SimulatorSelection,

    /// Working directory for compiled simulations
    #[arg(long = "work-dir", value_name = "DIR", default_value = DEFAULT_WORK_DIR)]
    pub work_dir: PathBuf,

    /// Report output file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_REPORT_PATH)]
    pub report: PathBuf,

    /// Project root containing rtl/, testbench/ and cpp_testbench/
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Timeout for each external command, in seconds
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Runner configuration for these arguments.
    pub fn config(&self) -> RunnerConfig {
        RunnerConfig::new()
            .with_project_root(&self.root)
            .with_work_dir(&self.work_dir)
            .with_report_path(&self.report)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_selection(self.simulator)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::run_simulations(&cli.config()) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        // Failure messages belong to the console narrative on stdout; logs use stderr
        Err(e) => {
            if !e.message.is_empty() {
                println!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Structured logging to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .try_init();
}

// ============================================================================
// Tests
// ============================================================================
