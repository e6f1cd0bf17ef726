//! Output for the `check` hook entry point
//!
//! Claude Code reads the hook's exit status and standard error: exit 0
//! allows the call, exit 2 blocks it and shows standard error to the agent.

use crate::matcher::CheckResult;

/// Exit status that blocks the tool call
pub const BLOCK_EXIT_CODE: i32 = 2;

/// Exit status that allows the tool call
pub const ALLOW_EXIT_CODE: i32 = 0;

/// Longest matched value printed in debug mode
pub const DEBUG_DISPLAY_LIMIT: usize = 200;

/// Decision for one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Allow the call
    Allow { reason: String },

    /// Block the call with a route's message
    Block { route_name: String, message: String },

    /// Routing could not run; the call is allowed
    Unavailable { reason: String },
}

impl Decision {
    /// Create an allow decision
    pub fn allow(reason: impl Into<String>) -> Self {
        Decision::Allow {
            reason: reason.into(),
        }
    }

    /// Create a block decision
    pub fn block(route_name: impl Into<String>, message: impl Into<String>) -> Self {
        Decision::Block {
            route_name: route_name.into(),
            message: message.into(),
        }
    }

    /// Create a fail-open decision
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Decision::Unavailable {
            reason: reason.into(),
        }
    }

    /// Decision for a matcher result
    pub fn from_check(result: &CheckResult) -> Self {
        match (&result.route_name, &result.message) {
            (Some(route_name), Some(message)) if result.blocked => {
                Decision::block(route_name.clone(), message.clone())
            }
            _ => Decision::allow("no route matched"),
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Decision::Block { .. })
    }

    /// Route name if blocked
    pub fn route_name(&self) -> Option<&str> {
        match self {
            Decision::Block { route_name, .. } => Some(route_name),
            _ => None,
        }
    }

    /// Human-readable reason (the message when blocked)
    pub fn reason(&self) -> &str {
        match self {
            Decision::Allow { reason } => reason,
            Decision::Block { message, .. } => message,
            Decision::Unavailable { reason } => reason,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_block() {
            BLOCK_EXIT_CODE
        } else {
            ALLOW_EXIT_CODE
        }
    }
}

/// What the hook process emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutput {
    pub exit_code: i32,
    pub stderr: String,
}

impl HookOutput {
    /// Allow with no output
    pub fn allow() -> Self {
        Self {
            exit_code: ALLOW_EXIT_CODE,
            stderr: String::new(),
        }
    }

    /// Output for a matcher result. Debug mode prefixes the block message
    /// with the route name, the (truncated) matched value and the pattern.
    pub fn from_check(result: &CheckResult, debug: bool) -> Self {
        if !result.blocked {
            return Self::allow();
        }

        let mut stderr = String::new();
        if debug {
            stderr.push_str(&format!(
                "❌ Tool Routing: {}\n",
                result.route_name.as_deref().unwrap_or("")
            ));
            if let Some(value) = &result.matched_value {
                stderr.push_str(&format!("Matched: {}\n", truncate(value, DEBUG_DISPLAY_LIMIT)));
            }
            stderr.push_str(&format!(
                "Pattern: {}\n\n",
                result.pattern.as_deref().unwrap_or("")
            ));
        }
        stderr.push_str(result.message.as_deref().unwrap_or(""));
        stderr.push('\n');

        Self {
            exit_code: BLOCK_EXIT_CODE,
            stderr,
        }
    }
}

/// Truncate to `limit` characters, marking the cut with "..."
pub fn truncate(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_string(),
    }
}
