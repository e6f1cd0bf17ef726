//! Matching a tool invocation against merged routes
//!
//! Unmonitored tools and empty designated fields return before any route is
//! looked at. Otherwise routes are tried in merge order and the first match
//! wins. A route whose pattern does not compile is skipped.
//!
//! Note that this gives earlier-discovered sources unconditional priority:
//! when two routes overlap, the one from the earlier source decides, however
//! specific the later pattern is.

use log::debug;

use crate::input::HookInput;
use crate::merge::RouteSet;

/// Outcome of checking one tool call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub blocked: bool,
    pub route_name: Option<String>,
    pub message: Option<String>,
    pub matched_value: Option<String>,
    pub pattern: Option<String>,
}

impl CheckResult {
    /// Not blocked
    pub fn allowed() -> Self {
        Self::default()
    }
}

/// Check a tool call against all routes.
pub fn check_tool_call(input: &HookInput, routes: &RouteSet) -> CheckResult {
    let Some((kind, value)) = input.monitored_value() else {
        return CheckResult::allowed();
    };

    for (route, regex) in routes.compiled().filter(|(r, _)| r.tool == kind.name()) {
        if regex.is_match(value) {
            debug!("matched route '{}' ({})", route.name, route.source_label());
            return CheckResult {
                blocked: true,
                route_name: Some(route.name.clone()),
                message: Some(route.message.clone()),
                matched_value: Some(value.to_string()),
                pattern: Some(route.pattern.clone()),
            };
        }
    }

    CheckResult::allowed()
}
