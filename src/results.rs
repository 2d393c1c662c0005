//! Test results and the per-run result set
//!
//! A [`TestResult`] is built once, fully formed, by the pipeline and then handed to
//! [`ResultSet::record`]. Its JSON shape is the `detailed_results` contract of the report.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::config::Simulator;

/// Outcome of one test on one toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
        }
    }
}

/// Last phase a test reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// iverilog compilation
    Compile,
    /// Verilator build
    Build,
    Simulation,
}

/// Elapsed seconds per phase. Absent fields were never reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_time: Option<f64>,
}

impl Timings {
    /// Timings with only the build-step entry for `phase` set.
    pub fn build_step(phase: Phase, secs: f64) -> Self {
        let mut timings = Self::default();
        match phase {
            Phase::Compile => timings.compile_time = Some(secs),
            Phase::Build => timings.build_time = Some(secs),
            Phase::Simulation => timings.run_time = Some(secs),
        }
        timings
    }

    pub fn with_run_time(mut self, secs: f64) -> Self {
        self.run_time = Some(secs);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub status: TestStatus,
    pub phase: Phase,
    #[serde(flatten)]
    pub timings: Timings,
    /// Simulation stdout; absent when the build step failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub error: Option<String>,
}

impl TestResult {
    /// A build step that exited non-zero. The run phase never happened.
    pub fn build_failed(phase: Phase, build_secs: f64, stderr: String) -> Self {
        Self {
            status: TestStatus::Failed,
            phase,
            timings: Timings::build_step(phase, build_secs),
            output: None,
            error: Some(stderr),
        }
    }

    /// A completed simulation run. Empty stderr is recorded as absent.
    pub fn simulated(
        status: TestStatus,
        build_phase: Phase,
        build_secs: f64,
        run_secs: f64,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self {
            status,
            phase: Phase::Simulation,
            timings: Timings::build_step(build_phase, build_secs).with_run_time(run_secs),
            output: Some(stdout),
            error: if stderr.is_empty() { None } else { Some(stderr) },
        }
    }

    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Results of one toolchain, in execution order
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorResults {
    pub simulator: Simulator,
    pub results: Vec<(String, TestResult)>,
}

impl SimulatorResults {
    fn new(simulator: Simulator) -> Self {
        Self {
            simulator,
            results: Vec::new(),
        }
    }

    pub fn get(&self, test_name: &str) -> Option<&TestResult> {
        self.results.iter().find(|(name, _)| name == test_name).map(|(_, r)| r)
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }
}

/// Accumulated results of a suite run.
///
/// Serializes as `{"<simulator>": {"<test>": {...}}, ..., "total_time": <secs>}`,
/// keeping execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    runs: Vec<SimulatorResults>,
    total_time: f64,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the section for `simulator`, dropping earlier results.
    pub fn begin(&mut self, simulator: Simulator) {
        match self.runs.iter_mut().find(|r| r.simulator == simulator) {
            Some(run) => run.results.clear(),
            None => self.runs.push(SimulatorResults::new(simulator)),
        }
    }

    /// Store the result for one test, replacing any earlier result under the same name.
    pub fn record(&mut self, simulator: Simulator, test_name: impl Into<String>, result: TestResult) {
        let test_name = test_name.into();
        let run = match self.runs.iter().position(|r| r.simulator == simulator) {
            Some(idx) => &mut self.runs[idx],
            None => {
                self.runs.push(SimulatorResults::new(simulator));
                let last = self.runs.len() - 1;
                &mut self.runs[last]
            }
        };
        match run.results.iter_mut().find(|(name, _)| *name == test_name) {
            Some((_, slot)) => *slot = result,
            None => run.results.push((test_name, result)),
        }
    }

    pub fn simulators(&self) -> impl Iterator<Item = &SimulatorResults> {
        self.runs.iter()
    }

    pub fn for_simulator(&self, simulator: Simulator) -> Option<&SimulatorResults> {
        self.runs.iter().find(|r| r.simulator == simulator)
    }

    pub fn get(&self, simulator: Simulator, test_name: &str) -> Option<&TestResult> {
        self.for_simulator(simulator).and_then(|r| r.get(test_name))
    }

    /// Number of recorded results across all simulators
    pub fn len(&self) -> usize {
        self.runs.iter().map(|r| r.results.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn set_total_time(&mut self, secs: f64) {
        self.total_time = secs;
    }

    /// True when every recorded result passed (vacuously true for an empty set).
    pub fn all_passed(&self) -> bool {
        self.runs.iter().flat_map(|r| r.results.iter()).all(|(_, r)| r.passed())
    }
}

struct OrderedResults<'a>(&'a [(String, TestResult)]);

impl Serialize for OrderedResults<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, result)| (name, result)))
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.runs.len() + 1))?;
        for run in &self.runs {
            map.serialize_entry(run.simulator.as_str(), &OrderedResults(&run.results))?;
        }
        map.serialize_entry("total_time", &self.total_time)?;
        map.end()
    }
}
