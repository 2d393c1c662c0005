//! Fixed catalog of simulation test cases.
//!
//! Paths are relative to the project root. The catalog is part of the tool's
//! configuration surface and is not changeable at runtime.

use std::path::PathBuf;

/// A single named testbench and the sources it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Test identifier; also the basis for artifact names
    pub name: String,
    /// RTL sources, in the order they are passed to the toolchain
    pub rtl_files: Vec<PathBuf>,
    /// Verilog testbench
    pub testbench_file: PathBuf,
    /// C++ harness linked into the Verilator executable
    pub harness_file: Option<PathBuf>,
}

impl TestCase {
    pub fn new(name: &str, rtl_files: &[&str], testbench_file: &str) -> Self {
        Self {
            name: name.to_string(),
            rtl_files: rtl_files.iter().map(PathBuf::from).collect(),
            testbench_file: PathBuf::from(testbench_file),
            harness_file: None,
        }
    }

    /// Attach a C++ harness source
    pub fn with_harness(mut self, harness_file: &str) -> Self {
        self.harness_file = Some(PathBuf::from(harness_file));
        self
    }

    /// RTL sources followed by the testbench.
    pub fn source_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.rtl_files.iter().chain(std::iter::once(&self.testbench_file))
    }
}

const MARKET_DATA_RTL: &str = "rtl/market_data_processor.v";
const ORDER_MANAGER_RTL: &str = "rtl/order_manager.v";
const TRADING_STRATEGY_RTL: &str = "rtl/trading_strategy.v";

/// The four FPGA trading system testbenches, unit tests first.
pub fn default_catalog() -> Vec<TestCase> {
    vec![
        TestCase::new("market_data_tb", &[MARKET_DATA_RTL], "testbench/market_data_tb.v"),
        TestCase::new("order_manager_tb", &[ORDER_MANAGER_RTL], "testbench/order_manager_tb.v"),
        TestCase::new("trading_strategy_tb", &[TRADING_STRATEGY_RTL], "testbench/trading_strategy_tb.v"),
        TestCase::new(
            "fpga_trading_system_tb",
            &[MARKET_DATA_RTL, ORDER_MANAGER_RTL, TRADING_STRATEGY_RTL],
            "testbench/fpga_trading_system_tb.v",
        )
        .with_harness("cpp_testbench/fpga_trading_system_test.cpp"),
    ]
}
