//! Console summary and performance sections
//!
//! Both renderers are pure: they read a finished [`ResultSet`] and return text.

use crate::results::{ResultSet, TestResult};

/// Characters of error text shown per failed test
pub const ERROR_PREVIEW_CHARS: usize = 100;

const RULE_WIDTH: usize = 50;

/// Output-line keywords echoed by the performance section, in display order
pub const METRIC_KEYWORDS: [&str; 2] = ["latency", "throughput"];

fn banner(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    out.push_str(&format!("{rule}\n{title}\n{rule}\n"));
}

/// Render the end-of-run summary.
pub fn render_summary(results: &ResultSet) -> String {
    let mut out = String::new();
    banner(&mut out, "SIMULATION SUMMARY");
    out.push_str(&format!("Total execution time: {:.2} seconds\n", results.total_time()));

    for run in results.simulators() {
        out.push_str(&format!("\n{} Results:\n", run.simulator.as_str().to_uppercase()));
        for (name, result) in &run.results {
            render_result(&mut out, name, result);
        }
    }

    let overall = if results.all_passed() {
        "🎉 ALL TESTS PASSED"
    } else {
        "⚠️ SOME TESTS FAILED"
    };
    out.push_str(&format!("\nOverall Status: {overall}\n"));
    out
}

fn render_result(out: &mut String, name: &str, result: &TestResult) {
    let icon = if result.passed() { "✅" } else { "❌" };
    out.push_str(&format!("  {icon} {name}: {}\n", result.status.as_str()));

    let timings = [
        ("Compile time", result.timings.compile_time),
        ("Build time", result.timings.build_time),
        ("Run time", result.timings.run_time),
    ];
    // Zero timings are treated as absent
    for (label, secs) in timings {
        if let Some(secs) = secs.filter(|s| *s != 0.0) {
            out.push_str(&format!("    {label}: {secs:.3}s\n"));
        }
    }

    if !result.passed() {
        if let Some(error) = result.error.as_deref().filter(|e| !e.is_empty()) {
            let preview: String = error.chars().take(ERROR_PREVIEW_CHARS).collect();
            out.push_str(&format!("    Error: {preview}...\n"));
        }
    }
}

/// Lines of `output` mentioning a performance keyword: all `latency` lines, then all
/// `throughput` lines, trimmed. Matching is case-insensitive.
pub fn extract_metrics(output: &str) -> Vec<&str> {
    METRIC_KEYWORDS
        .iter()
        .flat_map(move |keyword| {
            output
                .lines()
                .filter(move |line| line.to_lowercase().contains(keyword))
                .map(str::trim)
        })
        .collect()
}

/// Render the performance section from passed results' stdout.
pub fn render_performance(results: &ResultSet) -> String {
    let mut out = String::new();
    banner(&mut out, "PERFORMANCE ANALYSIS");

    for run in results.simulators() {
        out.push_str(&format!("\n{} Performance:\n", run.simulator.as_str().to_uppercase()));
        for (name, result) in &run.results {
            if !result.passed() {
                continue;
            }
            let Some(output) = result.output.as_deref() else {
                continue;
            };
            for line in extract_metrics(output) {
                out.push_str(&format!("  {name}: {line}\n"));
            }
        }
    }
    out
}
