//! Library-level tests: discovery, merge and matching over real rule files

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tool_routing::config::{Config, DiscoveryStrategy, Settings};
use tool_routing::discovery::{discover_route_files, PluginHost, PluginRecord};
use tool_routing::error::HostError;
use tool_routing::fixtures::run_route_tests;
use tool_routing::{HookInput, RoutingEngine, RoutingUnavailable};

struct NoPlugins;

impl PluginHost for NoPlugins {
    fn enabled_plugins(&self) -> Result<Vec<PluginRecord>, HostError> {
        Ok(Vec::new())
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    path.to_path_buf()
}

fn call(json: &str) -> HookInput {
    HookInput::from_json(json).unwrap()
}

fn route_yaml(name: &str, tool: &str, pattern: &str, message: &str) -> String {
    format!(
        "routes:\n  {}:\n    tool: {}\n    pattern: '{}'\n    message: {}\n",
        name, tool, pattern, message
    )
}

/// A plugins directory with this plugin, one sibling and a project
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    fn settings(&self) -> Settings {
        let root = self.dir.path();
        let mut settings = Settings::from_config(Config::default(), |_| None, root.join("project"));
        settings.plugin_root = root.join("plugins/tool-routing");
        settings.plugins_dir = root.join("plugins");
        settings.strategy = DiscoveryStrategy::Scan;
        settings
    }
}

#[test]
fn test_atlassian_scenarios() {
    let ws = Workspace::new();
    write(
        &ws.path("plugins/tool-routing/hooks/tool-routes.yaml"),
        &route_yaml("atlassian", "WebFetch", r"atlassian\.net", "Use Atlassian MCP tools"),
    );
    let engine = RoutingEngine::load(&ws.settings(), &NoPlugins).unwrap();

    let blocked = engine.check(&call(
        r#"{"tool_name":"WebFetch","tool_input":{"url":"https://acme.atlassian.net/browse/X-1"}}"#,
    ));
    assert!(blocked.blocked);
    assert!(blocked.message.unwrap().contains("Atlassian MCP tools"));

    let allowed = engine.check(&call(
        r#"{"tool_name":"WebFetch","tool_input":{"url":"https://example.com"}}"#,
    ));
    assert!(!allowed.blocked);

    let unmonitored = engine.check(&call(r#"{"tool_name":"Read","tool_input":{"file_path":"/x"}}"#));
    assert!(!unmonitored.blocked);
}

#[test]
fn test_case_insensitive_substring_search() {
    let ws = Workspace::new();
    write(
        &ws.path("plugins/tool-routing/hooks/tool-routes.yaml"),
        &route_yaml("gh-pr", "Bash", "gh pr view", "Use the GitHub MCP server"),
    );
    let engine = RoutingEngine::load(&ws.settings(), &NoPlugins).unwrap();

    let result = engine.check(&call(
        r#"{"tool_name":"Bash","tool_input":{"command":"cd repo && GH PR VIEW 12"}}"#,
    ));
    assert!(result.blocked);
    assert_eq!(result.route_name.as_deref(), Some("gh-pr"));
}

#[test]
fn test_own_plugin_wins_over_project() {
    let ws = Workspace::new();
    write(
        &ws.path("project/.claude/tool-routes.yaml"),
        &route_yaml("project-curl", "Bash", "curl", "project says no"),
    );
    write(
        &ws.path("plugins/other/hooks/tool-routes.yaml"),
        &route_yaml("other-curl", "Bash", "curl", "other plugin says no"),
    );
    write(
        &ws.path("plugins/tool-routing/hooks/tool-routes.yaml"),
        &route_yaml("own-curl", "Bash", "curl", "own plugin says no"),
    );

    let engine = RoutingEngine::load(&ws.settings(), &NoPlugins).unwrap();
    let names: Vec<&str> = engine.routes().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["own-curl", "other-curl", "project-curl"]);

    let result = engine.check(&call(r#"{"tool_name":"Bash","tool_input":{"command":"curl x"}}"#));
    assert_eq!(result.message.as_deref(), Some("own plugin says no"));
}

#[test]
fn test_skill_and_versioned_layouts() {
    let ws = Workspace::new();
    let skill = write(
        &ws.path("plugins/docs/skills/search/hooks/tool-routes.yaml"),
        &route_yaml("docs-search", "WebFetch", "docs\\.example", "Use the docs search skill"),
    );
    let versioned = write(
        &ws.path("plugins/git/1.2.0/hooks/tool-routes.yaml"),
        &route_yaml("git-log", "Bash", "git log --all", "Use the history tool"),
    );

    let files = discover_route_files(&ws.settings(), &NoPlugins);
    assert_eq!(files, vec![skill, versioned]);
}

#[test]
fn test_conflict_names_both_sources() {
    let ws = Workspace::new();
    let body = route_yaml("foo", "Bash", "x", "y");
    let a = write(&ws.path("plugins/a/hooks/tool-routes.yaml"), &body);
    let b = write(&ws.path("plugins/b/hooks/tool-routes.yaml"), &body);

    let err = RoutingEngine::load(&ws.settings(), &NoPlugins).unwrap_err();
    assert!(matches!(err, RoutingUnavailable::Conflict(_)));
    let text = err.to_string();
    assert!(text.contains("'foo'"));
    assert!(text.contains(&a.display().to_string()));
    assert!(text.contains(&b.display().to_string()));
}

#[test]
fn test_broken_file_is_skipped() {
    let ws = Workspace::new();
    write(&ws.path("plugins/a/hooks/tool-routes.yaml"), "routes: [unterminated");
    write(
        &ws.path("plugins/b/hooks/tool-routes.yaml"),
        &route_yaml("b", "Bash", "rm -rf", "no"),
    );

    let engine = RoutingEngine::load(&ws.settings(), &NoPlugins).unwrap();
    assert_eq!(engine.routes().len(), 1);
}

#[test]
fn test_invalid_pattern_does_not_hide_later_routes() {
    let ws = Workspace::new();
    write(
        &ws.path("plugins/tool-routing/hooks/tool-routes.yaml"),
        "routes:\n  broken:\n    tool: Bash\n    pattern: '(unclosed'\n    message: never\n  \
         working:\n    tool: Bash\n    pattern: 'unclosed'\n    message: works\n",
    );

    let engine = RoutingEngine::load(&ws.settings(), &NoPlugins).unwrap();
    let result = engine.check(&call(r#"{"tool_name":"Bash","tool_input":{"command":"(unclosed"}}"#));
    assert_eq!(result.route_name.as_deref(), Some("working"));
}

#[test]
fn test_inline_substring_mismatch() {
    let ws = Workspace::new();
    write(
        &ws.path("plugins/tool-routing/hooks/tool-routes.yaml"),
        r#"routes:
  gh-issue:
    tool: Bash
    pattern: 'gh issue view'
    message: Use gh issue view instead
    tests:
      - input:
          tool_name: Bash
          tool_input:
            command: gh issue view 3
        expect: block
        contains: gh pr view
"#,
    );

    let engine = RoutingEngine::load(&ws.settings(), &NoPlugins).unwrap();
    let results = run_route_tests(engine.routes());
    assert_eq!(results.len(), 1);
    assert!(!results[0].passed);
    assert_eq!(results[0].expected, results[0].actual);
    assert!(results[0].contains_error.as_deref().unwrap().contains("gh pr view"));
}

#[test]
fn test_installed_version_layout() {
    let ws = Workspace::new();
    let atlassian = route_yaml("atlassian", "WebFetch", r"atlassian\.net", "Use Atlassian MCP tools");
    write(&ws.path("plugins/tool-routing/1.0.0/hooks/tool-routes.yaml"), &atlassian);
    let current = write(&ws.path("plugins/tool-routing/1.1.0/hooks/tool-routes.yaml"), &atlassian);
    let sibling = write(
        &ws.path("plugins/sibling/2.0.0/hooks/tool-routes.yaml"),
        &route_yaml("gh-pr", "Bash", "gh pr view", "Use the GitHub MCP server"),
    );

    let plugin_root = ws.path("plugins/tool-routing/1.1.0").to_string_lossy().into_owned();
    let settings = Settings::from_config(
        Config::default(),
        |key| (key == "CLAUDE_PLUGIN_ROOT").then(|| plugin_root.clone()),
        ws.path("project"),
    );
    assert_eq!(settings.plugins_dir, ws.path("plugins"));
    assert_eq!(discover_route_files(&settings, &NoPlugins), vec![current.clone(), sibling]);

    let engine = RoutingEngine::load(&settings, &NoPlugins).unwrap();
    assert_eq!(engine.routes().len(), 2);
    assert_eq!(
        engine.routes().get("atlassian").unwrap().source.as_deref(),
        Some(current.display().to_string().as_str())
    );
    assert!(engine
        .check(&call(r#"{"tool_name":"Bash","tool_input":{"command":"gh pr view 3"}}"#))
        .blocked);
}
