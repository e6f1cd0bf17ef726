//! Input parsing for Claude Code hook JSON format
//!
//! Parses the JSON tool invocation that Claude Code sends to the hook on
//! stdin, and maps monitored tool kinds to the input field routes match.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool kinds whose invocations are checked against routes.
///
/// Each kind names the single `tool_input` field its routes match against.
/// Adding a monitored tool is one new variant plus its arms below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Network fetch; matched against the URL
    WebFetch,

    /// Shell execution; matched against the command string
    Bash,
}

impl ToolKind {
    /// Every monitored kind
    pub const ALL: [ToolKind; 2] = [ToolKind::WebFetch, ToolKind::Bash];

    /// Resolve a tool name as sent by the host (exact, case-sensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "WebFetch" => Some(ToolKind::WebFetch),
            "Bash" => Some(ToolKind::Bash),
            _ => None,
        }
    }

    /// Tool name as it appears in hook input and rule files
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::WebFetch => "WebFetch",
            ToolKind::Bash => "Bash",
        }
    }

    /// The `tool_input` field matched for this kind
    pub fn field(self) -> &'static str {
        match self {
            ToolKind::WebFetch => "url",
            ToolKind::Bash => "command",
        }
    }
}

/// A tool invocation as received from Claude Code hooks
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HookInput {
    /// Name of the tool being invoked (e.g., "WebFetch", "Bash", "Read")
    #[serde(default)]
    pub tool_name: String,

    /// Tool-specific input parameters, kept verbatim
    #[serde(default)]
    pub tool_input: Map<String, Value>,

    /// Optional session identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Hook event name (e.g., "PreToolUse")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_event_name: Option<String>,
}

impl HookInput {
    /// Parse input from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build an invocation from a tool name and its input object
    pub fn new(tool_name: impl Into<String>, tool_input: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_input,
            session_id: None,
            hook_event_name: None,
        }
    }

    /// The monitored kind and its non-empty designated value, if any.
    ///
    /// Returns `None` for unmonitored tools and for a designated field that
    /// is absent, empty, or not a string.
    pub fn monitored_value(&self) -> Option<(ToolKind, &str)> {
        let kind = ToolKind::from_name(&self.tool_name)?;
        let value = self.tool_input.get(kind.field())?.as_str()?;
        if value.is_empty() {
            return None;
        }
        Some((kind, value))
    }

    /// Get a summary of the input for logging
    pub fn summary(&self) -> String {
        match self.monitored_value() {
            Some((kind, value)) => {
                let truncated: String = value.chars().take(100).collect();
                if truncated.len() < value.len() {
                    format!("{}: {}...", kind.name(), truncated)
                } else {
                    format!("{}: {}", kind.name(), truncated)
                }
            }
            None if self.tool_name.is_empty() => "unknown tool".to_string(),
            None => format!("{} (not monitored)", self.tool_name),
        }
    }
}
