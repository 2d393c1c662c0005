//! Toolchain pipelines
//!
//! Every toolchain runs a test in two steps: a build step producing a simulation
//! executable, then a run step whose stdout decides the verdict. The toolchains
//! only differ in the commands they issue and the name of their build phase.
//!
//! ## Verdicts
//!
//! The run step passes when its stdout contains a success marker (`PASSED` or `✓`)
//! and no failure marker (`FAILED` or `✗`). Anything else fails, including empty
//! output and runs that died at the process level. This is plain substring search
//! over free-form simulator output.

use std::path::PathBuf;
use std::time::Instant;

use crate::catalog::TestCase;
use crate::config::Simulator;
use crate::executor::{CommandExecutor, CommandSpec, ExecError};
use crate::results::{Phase, TestResult, TestStatus};

/// Substrings that mark a passing testbench
pub const SUCCESS_MARKERS: [&str; 2] = ["PASSED", "✓"];

/// Substrings that mark a failing testbench; they override any success marker
pub const FAILURE_MARKERS: [&str; 2] = ["FAILED", "✗"];

/// Classify simulation stdout (fail-closed).
pub fn classify_output(stdout: &str) -> TestStatus {
    let passed = SUCCESS_MARKERS.iter().any(|m| stdout.contains(m));
    let failed = FAILURE_MARKERS.iter().any(|m| stdout.contains(m));
    if passed && !failed { TestStatus::Passed } else { TestStatus::Failed }
}

/// An external HDL toolchain.
pub trait Toolchain {
    fn simulator(&self) -> Simulator;

    /// Phase recorded for a failed build step
    fn build_phase(&self) -> Phase;

    /// Whether this toolchain runs `case` at all
    fn supports(&self, _case: &TestCase) -> bool {
        true
    }

    fn build_command(&self, case: &TestCase) -> CommandSpec;

    fn run_command(&self, case: &TestCase) -> CommandSpec;
}

/// Icarus Verilog: `iverilog` compiles to `<work_dir>/<test>`, `vvp` runs it from the work dir.
#[derive(Debug, Clone)]
pub struct Iverilog {
    work_dir: PathBuf,
}

impl Iverilog {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }
}

impl Toolchain for Iverilog {
    fn simulator(&self) -> Simulator {
        Simulator::Iverilog
    }

    fn build_phase(&self) -> Phase {
        Phase::Compile
    }

    /// Cases with a C++ harness are Verilator-only.
    fn supports(&self, case: &TestCase) -> bool {
        case.harness_file.is_none()
    }

    fn build_command(&self, case: &TestCase) -> CommandSpec {
        CommandSpec::new("iverilog")
            .args(["-g2012", "-Wall", "-o"])
            .arg(self.work_dir.join(&case.name))
            .args(case.source_files())
    }

    fn run_command(&self, case: &TestCase) -> CommandSpec {
        CommandSpec::new("vvp").arg(&case.name).current_dir(&self.work_dir)
    }
}

/// Verilator: one `--build` invocation emits `obj_dir/V<top>` under the project root.
#[derive(Debug, Clone)]
pub struct Verilator {
    project_root: PathBuf,
}

impl Verilator {
    /// `project_root` should be absolute; the run step executes a path inside it.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Name of the generated model: the test name with a harness, else the name minus its `_tb` suffix.
    pub fn top_name(case: &TestCase) -> &str {
        if case.harness_file.is_some() {
            case.name.as_str()
        } else {
            case.name.strip_suffix("_tb").unwrap_or(case.name.as_str())
        }
    }
}

impl Toolchain for Verilator {
    fn simulator(&self) -> Simulator {
        Simulator::Verilator
    }

    fn build_phase(&self) -> Phase {
        Phase::Build
    }

    fn build_command(&self, case: &TestCase) -> CommandSpec {
        CommandSpec::new("verilator")
            .args(["--cc", "--exe", "--build", "--trace", "-Wall", "-Wno-fatal"])
            .args(case.source_files())
            .args(case.harness_file.iter())
    }

    fn run_command(&self, case: &TestCase) -> CommandSpec {
        CommandSpec::new(
            self.project_root
                .join("obj_dir")
                .join(format!("V{}", Self::top_name(case))),
        )
    }
}

/// Build and run one test case, timing each step.
///
/// A failed build step short-circuits: the result carries only the build timing and
/// the build's stderr.
#[tracing::instrument(skip_all, fields(simulator = %toolchain.simulator(), test = %case.name))]
pub fn run_test<T, E>(toolchain: &T, executor: &mut E, case: &TestCase) -> Result<TestResult, ExecError>
where
    T: Toolchain + ?Sized,
    E: CommandExecutor + ?Sized,
{
    let phase = toolchain.build_phase();

    let start = Instant::now();
    let build = executor.execute(&toolchain.build_command(case))?;
    let build_secs = start.elapsed().as_secs_f64();

    if !build.success() {
        tracing::debug!(code = build.code, "build step failed");
        return Ok(TestResult::build_failed(phase, build_secs, build.stderr));
    }

    let start = Instant::now();
    let run = executor.execute(&toolchain.run_command(case))?;
    let run_secs = start.elapsed().as_secs_f64();

    let status = classify_output(&run.stdout);
    tracing::debug!(code = run.code, status = status.as_str(), "simulation finished");

    Ok(TestResult::simulated(
        status,
        phase,
        build_secs,
        run_secs,
        run.stdout,
        run.stderr,
    ))
}
