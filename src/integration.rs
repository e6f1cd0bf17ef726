//! Integration evaluation
//!
//! Fixture tests can also be run end to end by an external evaluator, such
//! as a live agent asked to attempt each invocation. The plan handed out is
//! a numbered list of tests; the evaluator reports back, per id, what it
//! observed (`"blocked"` / `"allowed"`) and the message it was shown.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::error::EvaluateError;
use crate::merge::RouteSet;
use crate::routes::Expect;

/// One entry of the test plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationTest {
    pub id: usize,
    pub route: String,
    pub desc: String,
    pub tool: String,
    pub input: Map<String, Value>,
    pub expect: Expect,
    #[serde(default)]
    pub contains: Option<String>,
}

/// One entry of the evaluator's report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub id: usize,
    pub result: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Verdict for one planned test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedTest {
    pub id: usize,
    pub route: String,
    pub desc: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Score of a report against its plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluateResult {
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<EvaluatedTest>,
}

/// Flatten every route's tests into a plan with sequential ids from 0
pub fn list_integration_tests(routes: &RouteSet) -> Vec<IntegrationTest> {
    routes
        .iter()
        .flat_map(|route| route.tests.iter().map(move |test| (route, test)))
        .enumerate()
        .map(|(id, (route, test))| IntegrationTest {
            id,
            route: route.name.clone(),
            desc: test.desc.clone().unwrap_or_else(|| format!("test {}", id)),
            tool: if test.input.tool_name.is_empty() {
                route.tool.clone()
            } else {
                test.input.tool_name.clone()
            },
            input: test.input.tool_input.clone(),
            expect: test.expect,
            contains: test.contains.clone(),
        })
        .collect()
}

/// Map a reported outcome onto the `expect` vocabulary:
/// `blocked` → `block`, `allowed` → `allow`, any other `-ed` is stripped
pub fn normalize_result(result: &str) -> String {
    let word = result.trim().to_lowercase();
    match word.strip_suffix("ed") {
        Some(stem) => stem.to_string(),
        None => word,
    }
}

/// Score `report` against `tests`. Tests missing from the report fail.
pub fn evaluate_report(tests: &[IntegrationTest], report: &[ReportEntry]) -> EvaluateResult {
    let by_id: HashMap<usize, &ReportEntry> = report.iter().map(|r| (r.id, r)).collect();

    let results: Vec<EvaluatedTest> = tests
        .iter()
        .map(|test| {
            let mut verdict = EvaluatedTest {
                id: test.id,
                route: test.route.clone(),
                desc: test.desc.clone(),
                passed: false,
                expected: None,
                actual: None,
                error: None,
            };

            let Some(entry) = by_id.get(&test.id) else {
                verdict.error = Some("Missing from report".to_string());
                return verdict;
            };

            let actual = normalize_result(&entry.result);
            if actual != test.expect.as_str() {
                verdict.expected = Some(test.expect.as_str().to_string());
                verdict.actual = Some(actual);
                return verdict;
            }

            if let (Expect::Block, Some(needle)) = (test.expect, &test.contains) {
                let message = entry.message.as_deref().unwrap_or("");
                if !message.contains(needle.as_str()) {
                    verdict.error = Some(format!("Message does not contain '{}'", needle));
                    return verdict;
                }
            }

            verdict.passed = true;
            verdict
        })
        .collect();

    let passed = results.iter().filter(|r| r.passed).count();
    EvaluateResult {
        passed,
        failed: results.len() - passed,
        results,
    }
}

impl EvaluateResult {
    /// Human-readable breakdown
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.results.len() + 2);
        for result in &self.results {
            let status = if result.passed { "PASS" } else { "FAIL" };
            lines.push(format!(
                "{} [{}] {}: {}",
                status, result.id, result.route, result.desc
            ));
            if let Some(error) = &result.error {
                lines.push(format!("      {}", error));
            } else if let (Some(expected), Some(actual)) = (&result.expected, &result.actual) {
                lines.push(format!("      Expected: {}, Got: {}", expected, actual));
            }
        }
        lines.push(String::new());
        lines.push(format!("{} passed, {} failed", self.passed, self.failed));
        lines.join("\n")
    }
}

/// Read a test plan written by `integration-test --list`
pub fn read_test_plan(path: &Path) -> Result<Vec<IntegrationTest>, EvaluateError> {
    read_json(path)
}

/// Read an evaluator's report
pub fn read_report(path: &Path) -> Result<Vec<ReportEntry>, EvaluateError> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, EvaluateError> {
    let content = std::fs::read_to_string(path).map_err(|source| EvaluateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| EvaluateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
