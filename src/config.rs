//! Configuration for tool-routing
//!
//! [`Settings`] is resolved once at startup from built-in defaults, an
//! optional TOML file and the environment (highest precedence), then passed
//! to everything that needs it.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::discovery::scan::is_version_name;
use crate::routes::ROUTES_FILE_NAME;

/// Environment variables read by [`Settings::resolve`]
pub mod env {
    pub const PLUGIN_ROOT: &str = "CLAUDE_PLUGIN_ROOT";
    pub const PLUGINS_DIR: &str = "CLAUDE_PLUGINS_DIR";
    pub const PROJECT_ROOT: &str = "CLAUDE_PROJECT_ROOT";
    pub const PROJECT_DIR: &str = "CLAUDE_PROJECT_DIR";
    pub const DEBUG: &str = "TOOL_ROUTING_DEBUG";
    pub const ISOLATED: &str = "TOOL_ROUTING_ISOLATED";
    pub const ROUTES: &str = "TOOL_ROUTING_ROUTES";
    pub const DISCOVERY: &str = "TOOL_ROUTING_DISCOVERY";
    pub const CONFIG: &str = "TOOL_ROUTING_CONFIG";
}

/// How plugin rule files are found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryStrategy {
    /// Walk the plugins directory
    #[default]
    Scan,

    /// Ask the host for enabled plugins and read their manifests
    Manifest,
}

impl DiscoveryStrategy {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "scan" => Some(DiscoveryStrategy::Scan),
            "manifest" => Some(DiscoveryStrategy::Manifest),
            _ => None,
        }
    }
}

/// Discovery section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Discovery strategy
    pub strategy: DiscoveryStrategy,

    /// Command printing the enabled plugins as JSON
    pub host_command: Vec<String>,

    /// Time allowed for `host_command`, in milliseconds
    pub host_timeout_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            strategy: DiscoveryStrategy::Scan,
            host_command: vec![
                "claude".to_string(),
                "plugin".to_string(),
                "list".to_string(),
                "--json".to_string(),
            ],
            host_timeout_ms: 3000,
        }
    }
}

/// Debug section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Enable debug output and the decision log
    pub enabled: bool,

    /// Decision log path
    pub log_file: Option<String>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_file: Some("~/.claude/tool-routing-debug.log".to_string()),
        }
    }
}

/// Settings file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub debug: DebugConfig,
}

impl Config {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".claude/tool-routing/config.toml"))
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }
}

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// This plugin's install root
    pub plugin_root: PathBuf,

    /// Root scanned for sibling plugins
    pub plugins_dir: PathBuf,

    /// Current project
    pub project_root: PathBuf,

    /// Verbose block output, debug logging and the decision log
    pub debug: bool,

    /// Only load this plugin's own rule file
    pub isolated: bool,

    /// Explicit rule files; bypasses discovery
    pub routes_override: Option<Vec<PathBuf>>,

    pub strategy: DiscoveryStrategy,

    pub host_command: Vec<String>,

    pub host_timeout: Duration,

    /// Decision log path (used in debug mode)
    pub debug_log: Option<PathBuf>,

    /// Settings file problem, reported once logging is up
    pub config_error: Option<String>,
}

impl Settings {
    /// Resolve from the process environment
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve(|key| std::env::var(key).ok(), cwd)
    }

    /// Resolve from an environment lookup: reads the settings file, then
    /// applies the environment on top
    pub fn resolve<F>(lookup: F, cwd: PathBuf) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = non_empty(lookup(env::CONFIG))
            .map(|p| Config::expand_path(&p))
            .or_else(Config::default_path);

        let (config, config_error) = match path {
            Some(path) if path.exists() => match Config::load_from(&path) {
                Ok(config) => (config, None),
                Err(e) => (
                    Config::default(),
                    Some(format!("failed to load {}: {}", path.display(), e)),
                ),
            },
            _ => (Config::default(), None),
        };

        let mut settings = Self::from_config(config, lookup, cwd);
        settings.config_error = config_error;
        settings
    }

    /// Apply the environment to a loaded settings file
    pub fn from_config<F>(config: Config, lookup: F, cwd: PathBuf) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let plugin_root = non_empty(lookup(env::PLUGIN_ROOT))
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.clone());

        let plugins_dir = non_empty(lookup(env::PLUGINS_DIR))
            .map(PathBuf::from)
            .or_else(|| default_plugins_dir(&plugin_root))
            .unwrap_or_else(|| plugin_root.clone());

        let project_root = non_empty(lookup(env::PROJECT_ROOT))
            .or_else(|| non_empty(lookup(env::PROJECT_DIR)))
            .map(PathBuf::from)
            .unwrap_or(cwd);

        let routes_override = non_empty(lookup(env::ROUTES)).map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect()
        });

        let strategy = lookup(env::DISCOVERY)
            .and_then(|s| DiscoveryStrategy::from_str(&s))
            .unwrap_or(config.discovery.strategy);

        Self {
            plugin_root,
            plugins_dir,
            project_root,
            debug: config.debug.enabled || is_truthy(lookup(env::DEBUG)),
            isolated: is_truthy(lookup(env::ISOLATED)),
            routes_override,
            strategy,
            host_command: config.discovery.host_command,
            host_timeout: Duration::from_millis(config.discovery.host_timeout_ms),
            debug_log: config.debug.log_file.as_deref().map(Config::expand_path),
            config_error: None,
        }
    }

    /// Settings that load only `plugin_root`'s own rule file
    pub fn isolated(plugin_root: impl Into<PathBuf>) -> Self {
        let plugin_root = plugin_root.into();
        Self::from_config(
            Config::default(),
            |key| (key == env::ISOLATED).then(|| "1".to_string()),
            plugin_root.clone(),
        )
    }

    /// This plugin's rule file
    pub fn own_routes_file(&self) -> PathBuf {
        self.plugin_root.join("hooks").join(ROUTES_FILE_NAME)
    }

    /// The project-local rule file
    pub fn project_routes_file(&self) -> PathBuf {
        self.project_root.join(".claude").join(ROUTES_FILE_NAME)
    }
}

/// Parent of the plugin root, or its grandparent when the root is an
/// installed version directory (`<plugins>/<plugin>/<version>`)
fn default_plugins_dir(plugin_root: &Path) -> Option<PathBuf> {
    let parent = plugin_root.parent()?;
    let in_version_dir = plugin_root
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_version_name);

    if in_version_dir {
        parent.parent().map(Path::to_path_buf)
    } else {
        Some(parent.to_path_buf())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn is_truthy(value: Option<String>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}
