//! Runner configuration
//!
//! Defaults mirror the CLI defaults: both simulators, `sim` work directory,
//! `simulation_report.json`, and a five minute per-command timeout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-command timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default report file name
pub const DEFAULT_REPORT_PATH: &str = "simulation_report.json";

/// Default work directory (relative to the project root)
pub const DEFAULT_WORK_DIR: &str = "sim";

/// An external HDL toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Simulator {
    /// Icarus Verilog (`iverilog` + `vvp`)
    Iverilog,
    /// Verilator
    Verilator,
}

impl Simulator {
    /// Key used in the report and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Simulator::Iverilog => "iverilog",
            Simulator::Verilator => "verilator",
        }
    }

    /// Human-readable toolchain name for progress output.
    pub fn display_name(self) -> &'static str {
        match self {
            Simulator::Iverilog => "Icarus Verilog",
            Simulator::Verilator => "Verilator",
        }
    }
}

impl fmt::Display for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which toolchains a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SimulatorSelection {
    Iverilog,
    Verilator,
    #[default]
    Both,
}

impl SimulatorSelection {
    /// Selected simulators in execution order.
    pub fn simulators(self) -> &'static [Simulator] {
        match self {
            SimulatorSelection::Iverilog => &[Simulator::Iverilog],
            SimulatorSelection::Verilator => &[Simulator::Verilator],
            SimulatorSelection::Both => &[Simulator::Iverilog, Simulator::Verilator],
        }
    }
}

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Directory holding `rtl/`, `testbench/` and `cpp_testbench/`; commands run here
    pub project_root: PathBuf,
    /// Directory for compiled simulation artifacts
    pub work_dir: PathBuf,
    /// Where the JSON report is written
    pub report_path: PathBuf,
    /// Upper bound for each external command
    pub timeout: Duration,
    /// Toolchains to run
    pub selection: SimulatorSelection,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            selection: SimulatorSelection::default(),
        }
    }
}

impl RunnerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_selection(mut self, selection: SimulatorSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Work directory as seen from the project root.
    ///
    /// Absolute work directories are returned unchanged.
    pub fn resolved_work_dir(&self) -> PathBuf {
        resolve_path(&self.project_root, &self.work_dir)
    }
}

/// `path` as seen from `root`; absolute paths are returned unchanged.
pub(crate) fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() { path.to_path_buf() } else { root.join(path) }
}
