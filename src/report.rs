//! JSON report generation
//!
//! The report is the tool's only persisted artifact:
//!
//! ```json
//! {
//!   "summary": {"total_time": 1.2, "timestamp": 1760000000.0, "simulators": {"iverilog": {...}}},
//!   "detailed_results": {"iverilog": {"market_data_tb": {...}}, "total_time": 1.2}
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Simulator;
use crate::results::{ResultSet, SimulatorResults};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Aggregate counts for one simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatorSummary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage of passed tests; 0 when nothing ran
    pub pass_rate: f64,
}

impl SimulatorSummary {
    pub fn from_counts(passed: usize, failed: usize) -> Self {
        let total_tests = passed + failed;
        let pass_rate = if total_tests > 0 {
            passed as f64 / total_tests as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_tests,
            passed,
            failed,
            pass_rate,
        }
    }

    pub fn from_results(results: &SimulatorResults) -> Self {
        Self::from_counts(results.passed(), results.failed())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_time: f64,
    /// Seconds since the Unix epoch at report generation
    pub timestamp: f64,
    pub simulators: BTreeMap<Simulator, SimulatorSummary>,
}

impl ReportSummary {
    pub fn from_results(results: &ResultSet) -> Self {
        let simulators = results
            .simulators()
            .map(|run| (run.simulator, SimulatorSummary::from_results(run)))
            .collect();
        Self {
            total_time: results.total_time(),
            timestamp: unix_timestamp(),
            simulators,
        }
    }
}

/// The persisted report: summary plus the raw result set
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub summary: ReportSummary,
    pub detailed_results: &'a ResultSet,
}

impl<'a> Report<'a> {
    pub fn new(results: &'a ResultSet) -> Self {
        Self {
            summary: ReportSummary::from_results(results),
            detailed_results: results,
        }
    }

    /// Pretty-printed JSON with two-space indentation
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Serialize `report` and write it to `path`, replacing any existing file.
pub fn write_report(report: &Report<'_>, path: &Path) -> Result<(), ReportError> {
    let json = report.to_json()?;
    fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
