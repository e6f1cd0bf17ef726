//! Fixture test runner
//!
//! Runs every route's inline tests through the matcher against the whole
//! merged set, so a test sees exactly what a live tool call would.

use crate::matcher::check_tool_call;
use crate::merge::RouteSet;
use crate::routes::Expect;

/// Result of running a single fixture test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub route_name: String,
    pub source: String,
    pub desc: String,
    pub passed: bool,
    pub expected: Expect,
    pub actual: Expect,

    /// Set when the outcome matched but the block message lacked `contains`
    pub contains_error: Option<String>,
}

/// Run all inline tests, in route order
pub fn run_route_tests(routes: &RouteSet) -> Vec<TestResult> {
    let mut results: Vec<TestResult> = Vec::with_capacity(routes.test_count());

    for route in routes {
        for test in &route.tests {
            let check = check_tool_call(&test.input, routes);
            let actual = Expect::from_blocked(check.blocked);
            let mut passed = actual == test.expect;

            let mut contains_error = None;
            if let (true, true, Some(needle)) = (passed, check.blocked, &test.contains) {
                if !check.message.as_deref().unwrap_or("").contains(needle.as_str()) {
                    passed = false;
                    contains_error = Some(format!("Expected message to contain '{}'", needle));
                }
            }

            let desc = test
                .desc
                .clone()
                .unwrap_or_else(|| format!("test {}", results.len() + 1));

            results.push(TestResult {
                route_name: route.name.clone(),
                source: route.source_label().to_string(),
                desc,
                passed,
                expected: test.expect,
                actual,
                contains_error,
            });
        }
    }

    results
}

/// Results grouped by source file, groups in first-seen order
pub fn group_by_source(results: &[TestResult]) -> Vec<(&str, Vec<&TestResult>)> {
    let mut groups: Vec<(&str, Vec<&TestResult>)> = Vec::new();
    for result in results {
        match groups.iter_mut().find(|(source, _)| *source == result.source) {
            Some((_, members)) => members.push(result),
            None => groups.push((result.source.as_str(), vec![result])),
        }
    }
    groups
}

/// Format one source's results for display
pub fn format_results(results: &[&TestResult], source: &str) -> String {
    let mut lines = vec![source.to_string()];

    for result in results {
        let status = if result.passed { "✓" } else { "✗" };
        lines.push(format!("  {} {}: {}", status, result.route_name, result.desc));
        if !result.passed {
            match &result.contains_error {
                Some(error) => lines.push(format!("      {}", error)),
                None => lines.push(format!(
                    "      Expected: {}, Got: {}",
                    result.expected, result.actual
                )),
            }
        }
    }

    lines.join("\n")
}
