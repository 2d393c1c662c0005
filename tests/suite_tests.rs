//! Suite driver tests against a scripted executor
//!
//! No simulator is needed: the executor answers build commands with an exit code and
//! run commands with canned testbench output.

use std::fs;
use std::path::{Path, PathBuf};

use simrun::report::ReportSummary;
use simrun::runner::SuiteError;
use simrun::{
    CommandExecutor, CommandOutput, CommandSpec, ExecError, Phase, Report, ResultSet, Simulator,
    SimulatorSelection, SuiteReporter, SuiteRunner, TestCase, TestResult, TestStatus, write_report,
};

/// Answers every command through a closure and keeps a log of what ran.
struct FnExecutor<F> {
    respond: F,
    calls: Vec<CommandSpec>,
}

impl<F> FnExecutor<F>
where
    F: FnMut(&CommandSpec) -> Result<CommandOutput, ExecError>,
{
    fn new(respond: F) -> Self {
        Self {
            respond,
            calls: Vec::new(),
        }
    }
}

impl<F> CommandExecutor for FnExecutor<F>
where
    F: FnMut(&CommandSpec) -> Result<CommandOutput, ExecError>,
{
    fn execute(&mut self, command: &CommandSpec) -> Result<CommandOutput, ExecError> {
        self.calls.push(command.clone());
        (self.respond)(command)
    }
}

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl SuiteReporter for Recorder {
    fn on_simulator_start(&mut self, simulator: Simulator) {
        self.events.push(format!("start {simulator}"));
    }

    fn on_test_start(&mut self, simulator: Simulator, test: &TestCase) {
        self.events.push(format!("run {simulator} {}", test.name));
    }

    fn on_test_complete(&mut self, simulator: Simulator, test: &TestCase, result: &TestResult) {
        self.events
            .push(format!("done {simulator} {} {}", test.name, result.status.as_str()));
    }
}

fn temp_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("simrun_{}_{}", std::process::id(), name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn is_build(command: &CommandSpec) -> bool {
    command.program == Path::new("iverilog") || command.program == Path::new("verilator")
}

/// Every build succeeds and every testbench prints a pass line.
fn all_pass(command: &CommandSpec) -> Result<CommandOutput, ExecError> {
    if is_build(command) {
        Ok(CommandOutput::new(0, "", ""))
    } else {
        Ok(CommandOutput::new(0, "✓ all checks PASSED\nlatency: 8 cycles\n", ""))
    }
}

#[test]
fn test_both_toolchains_run_expected_tests() {
    let root = temp_root("both");
    let mut runner = SuiteRunner::new(FnExecutor::new(all_pass), &root, "sim");
    let mut recorder = Recorder::default();

    let results = runner.run_all(SimulatorSelection::Both, &mut recorder).unwrap();

    assert!(root.join("sim").is_dir());
    assert_eq!(results.len(), 7);
    assert!(results.all_passed());

    let iverilog = results.for_simulator(Simulator::Iverilog).unwrap();
    assert_eq!(iverilog.results.len(), 3);
    assert!(iverilog.get("fpga_trading_system_tb").is_none());

    let verilator = results.for_simulator(Simulator::Verilator).unwrap();
    assert_eq!(verilator.results.len(), 4);

    assert_eq!(recorder.events.first().map(String::as_str), Some("start iverilog"));
    assert!(recorder.events.contains(&"start verilator".to_string()));
    assert_eq!(
        recorder.events.last().map(String::as_str),
        Some("done verilator fpga_trading_system_tb PASSED")
    );
}

#[test]
fn test_commands_issued_per_toolchain() {
    let root = temp_root("commands");
    let mut runner = SuiteRunner::new(FnExecutor::new(all_pass), &root, "sim");
    runner.run_all(SimulatorSelection::Both, &mut Recorder::default()).unwrap();

    let calls = &runner.executor().calls;
    // two commands per attempted test
    assert_eq!(calls.len(), 14);

    assert_eq!(calls[0].program, PathBuf::from("iverilog"));
    assert_eq!(calls[1].program, PathBuf::from("vvp"));
    assert_eq!(calls[1].cwd, Some(PathBuf::from("sim")));

    let verilator_runs: Vec<_> = calls.iter().filter(|c| !is_build(c) && c.program != Path::new("vvp")).collect();
    assert_eq!(verilator_runs.len(), 4);
    assert_eq!(verilator_runs[0].program, root.join("obj_dir").join("Vmarket_data"));
    assert_eq!(verilator_runs[3].program, root.join("obj_dir").join("Vfpga_trading_system_tb"));
}

#[test]
fn test_build_failure_does_not_stop_suite() {
    let root = temp_root("build_failure");
    let respond = |command: &CommandSpec| {
        let names_order_manager = command.args.iter().any(|a| a.to_string_lossy().contains("order_manager_tb"));
        if command.program == Path::new("iverilog") && names_order_manager {
            Ok(CommandOutput::new(2, "", "testbench/order_manager_tb.v:10: syntax error"))
        } else {
            all_pass(command)
        }
    };
    let mut runner = SuiteRunner::new(FnExecutor::new(respond), &root, "sim");

    let results = runner
        .run_all(SimulatorSelection::Iverilog, &mut Recorder::default())
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(!results.all_passed());

    let failed = results.get(Simulator::Iverilog, "order_manager_tb").unwrap();
    assert_eq!(failed.status, TestStatus::Failed);
    assert_eq!(failed.phase, Phase::Compile);
    assert!(failed.timings.compile_time.is_some());
    assert!(failed.timings.run_time.is_none());
    assert!(failed.output.is_none());

    let after = results.get(Simulator::Iverilog, "trading_strategy_tb").unwrap();
    assert_eq!(after.status, TestStatus::Passed);

    // failed build: no vvp for order_manager_tb
    let runs = runner.executor().calls.iter().filter(|c| c.program == Path::new("vvp")).count();
    assert_eq!(runs, 2);
}

#[test]
fn test_ambiguous_output_fails_closed() {
    let root = temp_root("ambiguous");
    let respond = |command: &CommandSpec| {
        if is_build(command) {
            Ok(CommandOutput::new(0, "", ""))
        } else {
            Ok(CommandOutput::new(0, "✓ order accepted\n✗ error: stale quote\n", ""))
        }
    };
    let mut runner = SuiteRunner::new(FnExecutor::new(respond), &root, "sim");

    let results = runner
        .run_all(SimulatorSelection::Verilator, &mut Recorder::default())
        .unwrap();

    assert_eq!(results.len(), 4);
    assert!(
        results
            .simulators()
            .flat_map(|r| r.results.iter())
            .all(|(_, r)| r.status == TestStatus::Failed && r.phase == Phase::Simulation)
    );
}

#[test]
fn test_interrupt_aborts_suite() {
    let root = temp_root("interrupt");
    let mut seen = 0;
    let respond = move |command: &CommandSpec| {
        seen += 1;
        if seen == 3 { Err(ExecError::Interrupted) } else { all_pass(command) }
    };
    let mut runner = SuiteRunner::new(FnExecutor::new(respond), &root, "sim");
    let mut recorder = Recorder::default();

    let err = runner.run_all(SimulatorSelection::Both, &mut recorder).unwrap_err();

    assert!(err.is_interrupt());
    assert!(matches!(err, SuiteError::Exec(ExecError::Interrupted)));
    assert_eq!(runner.executor().calls.len(), 3);
    assert!(!recorder.events.iter().any(|e| e.contains("verilator")));
}

#[test]
fn test_single_selection_only_reports_that_simulator() {
    let root = temp_root("selection");
    let mut runner = SuiteRunner::new(FnExecutor::new(all_pass), &root, "sim");

    let results = runner
        .run_all(SimulatorSelection::Verilator, &mut Recorder::default())
        .unwrap();

    assert!(results.for_simulator(Simulator::Iverilog).is_none());
    let simulators: Vec<_> = results.simulators().map(|r| r.simulator).collect();
    assert_eq!(simulators, [Simulator::Verilator]);
}

#[test]
fn test_custom_catalog() {
    let root = temp_root("catalog");
    let catalog = vec![TestCase::new("alu_tb", &["rtl/alu.v"], "testbench/alu_tb.v")];
    let mut runner = SuiteRunner::new(FnExecutor::new(all_pass), &root, "sim").with_catalog(catalog);

    let results = runner
        .run_all(SimulatorSelection::Both, &mut Recorder::default())
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.get(Simulator::Verilator, "alu_tb").is_some());
}

#[test]
fn test_report_round_trips_summary_counts() {
    let root = temp_root("report");
    let respond = |command: &CommandSpec| {
        let is_integration = command.args.iter().any(|a| a.to_string_lossy().contains("fpga_trading_system"));
        if command.program == Path::new("verilator") && is_integration {
            Ok(CommandOutput::new(1, "", "%Error: Cannot find file"))
        } else {
            all_pass(command)
        }
    };
    let mut runner = SuiteRunner::new(FnExecutor::new(respond), &root, "sim");
    let results = runner
        .run_all(SimulatorSelection::Both, &mut Recorder::default())
        .unwrap();

    let path = root.join("simulation_report.json");
    let report = Report::new(&results);
    write_report(&report, &path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let summary: ReportSummary = serde_json::from_value(json["summary"].clone()).unwrap();

    assert_eq!(summary.simulators, report.summary.simulators);
    assert_eq!(summary.simulators[&Simulator::Iverilog].passed, 3);
    assert_eq!(summary.simulators[&Simulator::Verilator].failed, 1);
    assert_eq!(summary.simulators[&Simulator::Verilator].pass_rate, 75.0);

    let detailed = &json["detailed_results"];
    assert_eq!(detailed["total_time"], results.total_time());
    assert_eq!(detailed["verilator"]["fpga_trading_system_tb"]["phase"], "build");
    assert!(detailed["verilator"]["fpga_trading_system_tb"].get("run_time").is_none());
    assert_eq!(detailed["iverilog"]["market_data_tb"]["error"], serde_json::Value::Null);
}

#[test]
fn test_report_write_to_missing_directory_fails() {
    let results = ResultSet::new();
    let path = temp_root("missing").join("no_such_dir").join("report.json");
    assert!(write_report(&Report::new(&results), &path).is_err());
}

#[test]
fn test_absolute_work_dir_is_used_as_is() {
    let root = temp_root("absolute_work_dir");
    let work_dir = std::env::temp_dir().join(format!("simrun_{}_abs_sim", std::process::id()));
    let _ = fs::remove_dir_all(&work_dir);
    let mut runner = SuiteRunner::new(FnExecutor::new(all_pass), &root, &work_dir);

    runner.run_all(SimulatorSelection::Iverilog, &mut Recorder::default()).unwrap();

    assert!(work_dir.is_dir());
    assert!(!root.join(&work_dir).starts_with(&root));
    let calls = &runner.executor().calls;
    assert!(calls[0].args.contains(&work_dir.join("market_data_tb").into_os_string()));
    assert_eq!(calls[1].cwd.as_deref(), Some(work_dir.as_path()));
}
