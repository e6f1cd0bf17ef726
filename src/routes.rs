//! Route definitions and rule file loading
//!
//! A rule file is YAML with a top-level `routes` mapping. Loading is
//! fail-open: a missing file, unparseable YAML or a file without a `routes`
//! mapping yields no routes. A malformed entry inside `routes` is an
//! authoring bug and is returned as a [`LoadError`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::LoadError;
use crate::input::HookInput;

/// File name of a rule file in every discovery location
pub const ROUTES_FILE_NAME: &str = "tool-routes.yaml";

/// Expected outcome of a fixture test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expect {
    Block,
    Allow,
}

impl Expect {
    /// Outcome observed for a matcher result
    pub fn from_blocked(blocked: bool) -> Self {
        if blocked {
            Expect::Block
        } else {
            Expect::Allow
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Expect::Block => "block",
            Expect::Allow => "allow",
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline test case attached to a route
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestCase {
    /// Literal tool invocation (`tool_name`, `tool_input`)
    pub input: HookInput,

    /// Expected outcome
    pub expect: Expect,

    /// Optional human description
    #[serde(default)]
    pub desc: Option<String>,

    /// Substring the block message must contain
    #[serde(default)]
    pub contains: Option<String>,
}

/// A named routing rule
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Route name, unique across the merged set
    pub name: String,

    /// Tool kind this route applies to, as written in the rule file
    pub tool: String,

    /// Regex searched case-insensitively in the tool's designated field
    pub pattern: String,

    /// Remediation text shown when the route blocks
    pub message: String,

    /// Inline fixture tests
    pub tests: Vec<TestCase>,

    /// File the route was loaded from; set by the merge
    pub source: Option<String>,
}

impl Route {
    /// Create a route without tests or source
    pub fn new(
        name: impl Into<String>,
        tool: impl Into<String>,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tool: tool.into(),
            pattern: pattern.into(),
            message: message.into(),
            tests: Vec::new(),
            source: None,
        }
    }

    /// Attach a fixture test
    pub fn with_test(mut self, test: TestCase) -> Self {
        self.tests.push(test);
        self
    }

    /// Source label for display, empty when unset
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or("")
    }
}

/// One entry under `routes`, as written
#[derive(Debug, Deserialize)]
struct RouteDef {
    tool: String,
    pattern: String,
    message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    tests: Vec<TestCase>,
}

/// `tests:` with no value parses as null
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<TestCase>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<TestCase>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Why a rule file contributed nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// File does not exist
    Missing,

    /// File could not be read or is not valid YAML
    Unparseable(String),

    /// File has no top-level `routes` mapping
    NoRoutes,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Missing => f.write_str("file not found"),
            Unavailable::Unparseable(detail) => write!(f, "unparseable: {}", detail),
            Unavailable::NoRoutes => f.write_str("no top-level 'routes' mapping"),
        }
    }
}

/// Result of loading one rule file
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    /// Routes in file order
    Routes(Vec<Route>),

    /// The file contributed nothing, and why
    Unavailable(Unavailable),
}

impl Loaded {
    /// Routes, treating an unavailable file as empty
    pub fn into_routes(self) -> Vec<Route> {
        match self {
            Loaded::Routes(routes) => routes,
            Loaded::Unavailable(_) => Vec::new(),
        }
    }
}

/// Load the routes declared in one rule file.
pub fn load_routes_file(path: &Path) -> Result<Loaded, LoadError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(Loaded::Unavailable(Unavailable::Missing));
        }
        Err(e) => return Ok(Loaded::Unavailable(Unavailable::Unparseable(e.to_string()))),
    };

    let data: Value = match serde_yaml::from_str(&content) {
        Ok(data) => data,
        Err(e) => return Ok(Loaded::Unavailable(Unavailable::Unparseable(e.to_string()))),
    };

    let Some(entries) = data.get("routes").and_then(Value::as_mapping) else {
        return Ok(Loaded::Unavailable(Unavailable::NoRoutes));
    };

    let mut routes = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let name = key.as_str().ok_or_else(|| LoadError::InvalidName {
            path: path.to_path_buf(),
        })?;

        let def: RouteDef =
            serde_yaml::from_value(value.clone()).map_err(|source| LoadError::InvalidRoute {
                path: path.to_path_buf(),
                name: name.to_string(),
                source,
            })?;

        routes.push(Route {
            name: name.to_string(),
            tool: def.tool,
            pattern: def.pattern,
            message: def.message,
            tests: def.tests,
            source: None,
        });
    }

    Ok(Loaded::Routes(routes))
}
