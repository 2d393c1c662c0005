#![forbid(unsafe_code)]
//! simrun: HDL simulation runner
//!
//! Drives the FPGA trading system testbenches through Icarus Verilog and Verilator,
//! classifies each run from its textual output, and writes a JSON report plus a
//! console summary. It supervises processes and aggregates results; it does not
//! simulate anything itself.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Subprocess faults**: A failing or hanging simulator is never a panic. The executor turns it into a sentinel
//!   [`executor::CommandOutput`] and the pipeline records a FAILED result.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod executor;
pub mod report;
pub mod results;
pub mod runner;
pub mod summary;
pub mod toolchain;
pub mod version;

pub use catalog::{TestCase, default_catalog};
pub use config::{RunnerConfig, Simulator, SimulatorSelection};
pub use executor::{CommandExecutor, CommandOutput, CommandSpec, ExecError, ProcessExecutor};
pub use report::{Report, ReportSummary, SimulatorSummary, write_report};
pub use results::{Phase, ResultSet, TestResult, TestStatus, Timings};
pub use runner::{ConsoleReporter, SuiteReporter, SuiteRunner};
pub use toolchain::{Iverilog, Toolchain, Verilator, classify_output};
