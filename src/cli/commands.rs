//! CLI command implementations
//!
//! Command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;

use crate::config::RunnerConfig;
use crate::executor::ProcessExecutor;
use crate::report::{Report, write_report};
use crate::results::ResultSet;
use crate::runner::{ConsoleReporter, SuiteRunner};
use crate::summary::{render_performance, render_summary};

use super::{CliError, CliResult, ExitCode};

/// Message printed when the user aborts the run
pub const INTERRUPTED_MESSAGE: &str = "\nSimulation interrupted by user";

/// Run the configured simulations, write the report and print the summaries.
///
/// Returns `ExitCode::SUCCESS` only when every attempted test passed.
pub fn run_simulations(config: &RunnerConfig) -> CliResult<ExitCode> {
    // Absolute root: Verilator's run step executes a path inside it
    let root = fs::canonicalize(&config.project_root).map_err(|e| {
        CliError::failure(format!(
            "Error: cannot access project root '{}': {}",
            config.project_root.display(),
            e
        ))
    })?;
    let config = config.clone().with_project_root(root);

    let executor = ProcessExecutor::new(&config.project_root, config.timeout)
        .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    let mut runner = SuiteRunner::new(executor, &config.project_root, config.resolved_work_dir());
    let mut reporter = ConsoleReporter::new();

    let results = runner.run_all(config.selection, &mut reporter).map_err(|e| {
        if e.is_interrupt() {
            interrupt_error()
        } else {
            CliError::failure(format!("Error: {}", e))
        }
    })?;

    // Ctrl-C between the last command and here
    if runner.executor().interrupted() {
        return Err(interrupt_error());
    }

    println!("\nGenerating test report...");
    write_report(&Report::new(&results), &config.report_path)
        .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    println!("Report saved to {}", config.report_path.display());

    println!();
    print!("{}", render_summary(&results));
    println!();
    print!("{}", render_performance(&results));

    if runner.executor().interrupted() {
        return Err(interrupt_error());
    }
    Ok(exit_code(&results))
}

/// Exit status for a finished run: success only when nothing failed.
pub fn exit_code(results: &ResultSet) -> ExitCode {
    if results.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn interrupt_error() -> CliError {
    CliError::failure(INTERRUPTED_MESSAGE)
}
