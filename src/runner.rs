//! Suite driver
//!
//! Runs the catalog against each selected toolchain, strictly one command at a time,
//! and collects one [`TestResult`] per (toolchain, supported test). A failing test
//! never stops the suite; only a user interrupt does.
//!
//! ## SuiteReporter Trait
//!
//! Progress output goes through [`SuiteReporter`] so the driver stays free of
//! printing. [`ConsoleReporter`] gives the interactive console view.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;

use crate::catalog::{TestCase, default_catalog};
use crate::config::{Simulator, SimulatorSelection, resolve_path};
use crate::executor::{CommandExecutor, ExecError};
use crate::results::{ResultSet, TestResult};
use crate::toolchain::{Iverilog, Toolchain, Verilator, run_test};

/// Errors that abort a suite run
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("cannot create work directory '{}': {source}", .path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl SuiteError {
    pub fn is_interrupt(&self) -> bool {
        matches!(self, SuiteError::Exec(ExecError::Interrupted))
    }
}

// ============================================================================
// Suite Reporter Trait
// ============================================================================

/// Trait for reporting suite progress.
pub trait SuiteReporter {
    /// Called once before any toolchain runs
    fn on_suite_start(&mut self) {}

    /// Called before the first test of a toolchain
    fn on_simulator_start(&mut self, _simulator: Simulator) {}

    /// Called before a test is built
    fn on_test_start(&mut self, simulator: Simulator, test: &TestCase);

    /// Called once the test's result is recorded
    fn on_test_complete(&mut self, simulator: Simulator, test: &TestCase, result: &TestResult);

    /// Called after the last toolchain finished
    fn on_suite_complete(&mut self, _results: &ResultSet) {}
}

/// Default console reporter
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl SuiteReporter for ConsoleReporter {
    fn on_suite_start(&mut self) {
        let rule = "=".repeat(50);
        println!("{rule}");
        println!("FPGA Trading System Simulation Suite");
        println!("{rule}");
    }

    fn on_simulator_start(&mut self, simulator: Simulator) {
        println!("\nRunning {} tests...", simulator.display_name());
    }

    fn on_test_start(&mut self, simulator: Simulator, test: &TestCase) {
        println!("Running {} test: {}", simulator.display_name(), test.name);
    }

    fn on_test_complete(&mut self, _simulator: Simulator, test: &TestCase, result: &TestResult) {
        println!("  {}: {}", test.name, result.status.as_str());
    }
}

/// Sequential runner over the test catalog.
pub struct SuiteRunner<E: CommandExecutor> {
    executor: E,
    catalog: Vec<TestCase>,
    project_root: PathBuf,
    work_dir: PathBuf,
}

impl<E: CommandExecutor> SuiteRunner<E> {
    /// `project_root` should be absolute (see [`Verilator::new`]); `work_dir` may be
    /// relative to it.
    pub fn new(executor: E, project_root: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            catalog: default_catalog(),
            project_root: project_root.into(),
            work_dir: work_dir.into(),
        }
    }

    /// Replace the catalog
    pub fn with_catalog(mut self, catalog: Vec<TestCase>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn toolchain(&self, simulator: Simulator) -> Box<dyn Toolchain> {
        match simulator {
            Simulator::Iverilog => Box::new(Iverilog::new(&self.work_dir)),
            Simulator::Verilator => Box::new(Verilator::new(&self.project_root)),
        }
    }

    fn prepare_work_dir(&self) -> Result<(), SuiteError> {
        let path = resolve_path(&self.project_root, &self.work_dir);
        fs::create_dir_all(&path).map_err(|source| SuiteError::WorkDir { path, source })
    }

    /// Run every supported catalog entry on each selected toolchain.
    pub fn run_all(
        &mut self,
        selection: SimulatorSelection,
        reporter: &mut dyn SuiteReporter,
    ) -> Result<ResultSet, SuiteError> {
        self.prepare_work_dir()?;

        reporter.on_suite_start();
        let start = Instant::now();
        let mut results = ResultSet::new();

        for &simulator in selection.simulators() {
            let toolchain = self.toolchain(simulator);
            reporter.on_simulator_start(simulator);
            results.begin(simulator);

            for case in &self.catalog {
                if !toolchain.supports(case) {
                    tracing::debug!(%simulator, test = %case.name, "skipping unsupported test");
                    continue;
                }
                reporter.on_test_start(simulator, case);
                let result = run_test(toolchain.as_ref(), &mut self.executor, case)?;
                reporter.on_test_complete(simulator, case, &result);
                results.record(simulator, case.name.clone(), result);
            }
        }

        results.set_total_time(start.elapsed().as_secs_f64());
        reporter.on_suite_complete(&results);
        Ok(results)
    }
}
