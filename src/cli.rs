//! Command-line entry points
//!
//! Each handler takes its settings, the plugin host and the three standard
//! streams explicitly and returns the process exit code, so the binary is a
//! thin shell around these functions.

use clap::{ArgAction, Args, Parser, Subcommand};
use log::{debug, warn};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::audit::AuditLogger;
use crate::config::Settings;
use crate::discovery::PluginHost;
use crate::engine::RoutingEngine;
use crate::fixtures::{format_results, group_by_source, run_route_tests};
use crate::input::HookInput;
use crate::integration::{evaluate_report, list_integration_tests, read_report, read_test_plan};
use crate::output::{Decision, HookOutput, ALLOW_EXIT_CODE};

/// Exit status for authoring errors and failed tests
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "tool-routing",
    version,
    about = "Route agent tool calls away from patterns that have a better tool",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// PreToolUse hook: read one tool call on stdin, exit 2 to block it.
    Check,
    /// List every loaded route and where it came from.
    List,
    /// Run the inline tests declared by each route.
    Test,
    /// Hand route tests to an external evaluator and score its report.
    IntegrationTest(IntegrationTestCommand),
}

/// Configuration for the `integration-test` command.
#[derive(Args, Debug)]
pub struct IntegrationTestCommand {
    /// Print the test plan as JSON.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "evaluate")]
    pub list: bool,
    /// Score a report against a test plan.
    #[arg(long, action = ArgAction::SetTrue, requires_all = ["tests", "report"])]
    pub evaluate: bool,
    /// Test plan written by `--list`.
    #[arg(long, value_name = "PATH")]
    pub tests: Option<PathBuf>,
    /// Report produced by the evaluator.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
    /// Print the evaluation as JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}

/// Dispatch a parsed command
pub fn run(
    command: &Command,
    settings: &Settings,
    host: &dyn PluginHost,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32 {
    match command {
        Command::Check => run_check(settings, host, stdin, stderr),
        Command::List => run_list(settings, host, stdout, stderr),
        Command::Test => run_test(settings, host, stdout, stderr),
        Command::IntegrationTest(args) if args.evaluate => match (&args.tests, &args.report) {
            (Some(plan), Some(report)) => {
                run_integration_evaluate(plan, report, args.json, stdout, stderr)
            }
            _ => fail(stderr, "--evaluate requires --tests and --report"),
        },
        Command::IntegrationTest(args) if args.list => {
            run_integration_list(settings, host, stdout, stderr)
        }
        Command::IntegrationTest(_) => fail(stderr, "one of --list or --evaluate is required"),
    }
}

/// The hook. Every problem short of a matched route allows the call.
pub fn run_check(
    settings: &Settings,
    host: &dyn PluginHost,
    stdin: &mut dyn Read,
    stderr: &mut dyn Write,
) -> i32 {
    let mut audit = if settings.debug {
        AuditLogger::new(settings.debug_log.as_deref())
    } else {
        AuditLogger::default()
    };

    let mut raw = String::new();
    if let Err(e) = stdin.read_to_string(&mut raw) {
        return fail_open(&mut audit, &HookInput::default(), format!("unreadable stdin: {}", e));
    }

    let input = match HookInput::from_json(&raw) {
        Ok(input) => input,
        Err(e) => {
            return fail_open(&mut audit, &HookInput::default(), format!("malformed input: {}", e));
        }
    };

    let engine = match RoutingEngine::load(settings, host) {
        Ok(engine) => engine,
        Err(e) => return fail_open(&mut audit, &input, format!("routing unavailable: {}", e)),
    };

    let result = engine.check(&input);
    let output = HookOutput::from_check(&result, settings.debug);
    if !output.stderr.is_empty() {
        let _ = stderr.write_all(output.stderr.as_bytes());
        let _ = stderr.flush();
    }

    if let Err(e) = audit.log_decision(&input, &Decision::from_check(&result)) {
        debug!("failed to write decision log: {}", e);
    }
    output.exit_code
}

fn fail_open(audit: &mut AuditLogger, input: &HookInput, reason: String) -> i32 {
    debug!("allowing: {}", reason);
    if let Err(e) = audit.log_decision(input, &Decision::unavailable(reason)) {
        debug!("failed to write decision log: {}", e);
    }
    ALLOW_EXIT_CODE
}

/// Print every route
pub fn run_list(
    settings: &Settings,
    host: &dyn PluginHost,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32 {
    let engine = match RoutingEngine::load(settings, host) {
        Ok(engine) => engine,
        Err(e) => return fail(stderr, &e.to_string()),
    };
    finish(stderr, list_routes(&engine, stdout))
}

fn list_routes(engine: &RoutingEngine, out: &mut dyn Write) -> io::Result<i32> {
    let routes = engine.routes();
    if routes.is_empty() {
        writeln!(out, "No routes found.")?;
        return Ok(ALLOW_EXIT_CODE);
    }

    for route in routes {
        writeln!(out, "{}", route.name)?;
        writeln!(out, "  tool:    {}", route.tool)?;
        writeln!(out, "  pattern: {}", route.pattern)?;
        writeln!(out, "  tests:   {}", route.tests.len())?;
        writeln!(out, "  source:  {}", route.source_label())?;
        writeln!(out)?;
    }
    writeln!(
        out,
        "Total: {} route(s) from {} source(s)",
        routes.len(),
        routes.sources().len()
    )?;
    Ok(ALLOW_EXIT_CODE)
}

/// Run inline route tests
pub fn run_test(
    settings: &Settings,
    host: &dyn PluginHost,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32 {
    let engine = match RoutingEngine::load(settings, host) {
        Ok(engine) => engine,
        Err(e) => return fail(stderr, &e.to_string()),
    };
    finish(stderr, test_routes(&engine, stdout))
}

fn test_routes(engine: &RoutingEngine, out: &mut dyn Write) -> io::Result<i32> {
    let results = run_route_tests(engine.routes());
    if results.is_empty() {
        writeln!(out, "No tests found.")?;
        return Ok(ALLOW_EXIT_CODE);
    }

    for (source, members) in group_by_source(&results) {
        writeln!(out, "{}", format_results(&members, source))?;
        writeln!(out)?;
    }

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;
    writeln!(out, "{} passed, {} failed", passed, failed)?;

    Ok(if failed > 0 {
        FAILURE_EXIT_CODE
    } else {
        ALLOW_EXIT_CODE
    })
}

/// Print the integration test plan
pub fn run_integration_list(
    settings: &Settings,
    host: &dyn PluginHost,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32 {
    let engine = match RoutingEngine::load(settings, host) {
        Ok(engine) => engine,
        Err(e) => return fail(stderr, &e.to_string()),
    };

    let tests = list_integration_tests(engine.routes());
    match serde_json::to_string_pretty(&tests) {
        Ok(json) => finish(stderr, writeln!(stdout, "{}", json).map(|_| ALLOW_EXIT_CODE)),
        Err(e) => fail(stderr, &e.to_string()),
    }
}

/// Score an evaluator's report against a plan
pub fn run_integration_evaluate(
    plan: &Path,
    report: &Path,
    json: bool,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32 {
    let tests = match read_test_plan(plan) {
        Ok(tests) => tests,
        Err(e) => return fail(stderr, &e.to_string()),
    };
    let entries = match read_report(report) {
        Ok(entries) => entries,
        Err(e) => return fail(stderr, &e.to_string()),
    };

    let result = evaluate_report(&tests, &entries);
    let rendered = if json {
        match serde_json::to_string_pretty(&result) {
            Ok(text) => text,
            Err(e) => return fail(stderr, &e.to_string()),
        }
    } else {
        result.render()
    };

    let code = if result.failed > 0 {
        FAILURE_EXIT_CODE
    } else {
        ALLOW_EXIT_CODE
    };
    finish(stderr, writeln!(stdout, "{}", rendered).map(|_| code))
}

fn fail(stderr: &mut dyn Write, message: &str) -> i32 {
    let _ = writeln!(stderr, "Error: {}", message);
    FAILURE_EXIT_CODE
}

fn finish(stderr: &mut dyn Write, written: io::Result<i32>) -> i32 {
    written.unwrap_or_else(|e| {
        warn!("failed to write output: {}", e);
        fail(stderr, &e.to_string())
    })
}
