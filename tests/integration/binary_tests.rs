//! End-to-end tests against the compiled binary

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const ROUTES: &str = r#"routes:
  atlassian:
    tool: WebFetch
    pattern: 'atlassian\.net'
    message: Use Atlassian MCP tools
    tests:
      - input:
          tool_name: WebFetch
          tool_input:
            url: https://acme.atlassian.net/wiki
        expect: block
        desc: blocks confluence
  gh-pr:
    tool: Bash
    pattern: 'gh pr view'
    message: Use the GitHub MCP server
"#;

/// A plugin root with its own rule file and an empty home
struct Plugin {
    dir: TempDir,
}

impl Plugin {
    fn new(routes: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let hooks = dir.path().join("plugins/tool-routing/hooks");
        fs::create_dir_all(&hooks).unwrap();
        fs::write(hooks.join("tool-routes.yaml"), routes).unwrap();
        fs::create_dir_all(dir.path().join("home")).unwrap();
        fs::create_dir_all(dir.path().join("project")).unwrap();
        Self { dir }
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("plugins/tool-routing")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tool-routing"));
        cmd.args(args)
            .env_clear()
            .env("HOME", self.dir.path().join("home"))
            .env("TOOL_ROUTING_CONFIG", self.dir.path().join("home/missing.toml"))
            .env("CLAUDE_PLUGIN_ROOT", self.root())
            .env("CLAUDE_PROJECT_ROOT", self.dir.path().join("project"))
            .env("TOOL_ROUTING_ISOLATED", "1");
        cmd
    }

    fn run(&self, args: &[&str], stdin: &str) -> Output {
        run(self.command(args), stdin)
    }
}

fn run(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_check_blocks_with_exit_2() {
    let plugin = Plugin::new(ROUTES);
    let output = plugin.run(
        &["check"],
        r#"{"tool_name":"WebFetch","tool_input":{"url":"https://acme.atlassian.net/browse/X-1"}}"#,
    );

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr(&output), "Use Atlassian MCP tools\n");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_check_allows() {
    let plugin = Plugin::new(ROUTES);
    for stdin in [
        r#"{"tool_name":"WebFetch","tool_input":{"url":"https://example.com"}}"#,
        r#"{"tool_name":"Read","tool_input":{"file_path":"/x"}}"#,
        r#"{"tool_name":"Bash","tool_input":{}}"#,
        "",
        "{ not json",
    ] {
        let output = plugin.run(&["check"], stdin);
        assert_eq!(output.status.code(), Some(0), "stdin {:?}", stdin);
        assert!(output.stderr.is_empty(), "stdin {:?}: {}", stdin, stderr(&output));
    }
}

#[test]
fn test_check_debug_mode() {
    let plugin = Plugin::new(ROUTES);
    let mut cmd = plugin.command(&["check"]);
    cmd.env("TOOL_ROUTING_DEBUG", "1");
    let output = run(cmd, r#"{"tool_name":"Bash","tool_input":{"command":"gh pr view 7"}}"#);

    assert_eq!(output.status.code(), Some(2));
    let text = stderr(&output);
    assert!(text.contains("❌ Tool Routing: gh-pr\n"));
    assert!(text.contains("Matched: gh pr view 7\n"));
    assert!(text.contains("Pattern: gh pr view\n"));
    assert!(text.ends_with("\n\nUse the GitHub MCP server\n"));
}

#[test]
fn test_check_missing_rule_file_allows() {
    let plugin = Plugin::new(ROUTES);
    let mut cmd = plugin.command(&["check"]);
    cmd.env("CLAUDE_PLUGIN_ROOT", plugin.dir.path().join("nowhere"));
    let output = run(
        cmd,
        r#"{"tool_name":"WebFetch","tool_input":{"url":"https://acme.atlassian.net/x"}}"#,
    );
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_check_conflict_fails_open() {
    let plugin = Plugin::new(ROUTES);
    let copy = plugin.dir.path().join("copy.yaml");
    fs::write(&copy, ROUTES).unwrap();

    let own = plugin.root().join("hooks/tool-routes.yaml");
    let mut cmd = plugin.command(&["check"]);
    cmd.env(
        "TOOL_ROUTING_ROUTES",
        format!("{},{}", own.display(), copy.display()),
    );
    let output = run(
        cmd,
        r#"{"tool_name":"WebFetch","tool_input":{"url":"https://acme.atlassian.net/x"}}"#,
    );
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stderr.is_empty());
}

#[test]
fn test_list_and_test_commands() {
    let plugin = Plugin::new(ROUTES);

    let list = plugin.run(&["list"], "");
    assert_eq!(list.status.code(), Some(0));
    let text = stdout(&list);
    assert!(text.contains("atlassian\n"));
    assert!(text.contains("gh-pr\n"));
    assert!(text.contains("Total: 2 route(s) from 1 source(s)"));

    let test = plugin.run(&["test"], "");
    assert_eq!(test.status.code(), Some(0));
    let text = stdout(&test);
    assert!(text.contains("✓ atlassian: blocks confluence"));
    assert!(text.contains("1 passed, 0 failed"));
}

#[test]
fn test_list_conflict_exits_nonzero() {
    let plugin = Plugin::new(ROUTES);
    let copy = plugin.dir.path().join("copy.yaml");
    fs::write(&copy, ROUTES).unwrap();

    let own = plugin.root().join("hooks/tool-routes.yaml");
    let mut cmd = plugin.command(&["list"]);
    cmd.env(
        "TOOL_ROUTING_ROUTES",
        format!("{},{}", own.display(), copy.display()),
    );
    let output = run(cmd, "");

    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.contains("Route conflict: 'atlassian'"));
    assert!(text.contains(&own.display().to_string()));
    assert!(text.contains(&copy.display().to_string()));
}

#[test]
fn test_integration_round_trip() {
    let plugin = Plugin::new(ROUTES);
    let listed = plugin.run(&["integration-test", "--list"], "");
    assert_eq!(listed.status.code(), Some(0));

    let plan: serde_json::Value = serde_json::from_slice(&listed.stdout).unwrap();
    assert_eq!(plan.as_array().unwrap().len(), 1);
    assert_eq!(plan[0]["desc"], "blocks confluence");
    assert_eq!(plan[0]["contains"], serde_json::Value::Null);

    let plan_path = plugin.dir.path().join("plan.json");
    let report_path = plugin.dir.path().join("report.json");
    fs::write(&plan_path, &listed.stdout).unwrap();
    fs::write(&report_path, r#"[{"id": 0, "result": "allowed"}]"#).unwrap();

    let plan_arg = plan_path.to_string_lossy().into_owned();
    let report_arg = report_path.to_string_lossy().into_owned();
    let output = plugin.run(
        &[
            "integration-test",
            "--evaluate",
            "--tests",
            &plan_arg,
            "--report",
            &report_arg,
            "--json",
        ],
        "",
    );
    assert_eq!(output.status.code(), Some(1));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["failed"], 1);
    assert_eq!(result["results"][0]["expected"], "block");
    assert_eq!(result["results"][0]["actual"], "allow");
}

#[test]
fn test_list_reports_skipped_rule_file() {
    let plugin = Plugin::new("routes: [unterminated");
    let own = plugin.root().join("hooks/tool-routes.yaml");

    let output = plugin.run(&["list"], "");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "No routes found.\n");
    let text = stderr(&output);
    assert!(text.contains(&own.display().to_string()), "stderr: {}", text);
    assert!(text.contains("unparseable"));

    // The hook itself stays quiet
    let check = plugin.run(&["check"], r#"{"tool_name":"Bash","tool_input":{"command":"ls"}}"#);
    assert_eq!(check.status.code(), Some(0));
    assert!(check.stderr.is_empty());
}

#[test]
fn test_list_reports_file_without_routes() {
    let plugin = Plugin::new("rules:\n  foo: {}\n");
    let output = plugin.run(&["list"], "");
    let text = stderr(&output);
    assert!(text.contains("tool-routes.yaml"), "stderr: {}", text);
    assert!(text.contains("no top-level 'routes' mapping"));
}
