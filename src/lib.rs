//! tool-routing - Steer agent tool calls toward better tools
//!
//! A PreToolUse hook that blocks tool calls matching configured patterns and
//! tells the agent which tool to use instead. Plugins, skills and projects
//! each contribute routes in a `tool-routes.yaml` file; they are merged into
//! one ordered rule set and the first matching route wins.
//!
//! # Features
//!
//! - **Discovery**: filesystem scan or plugin manifests via the host's plugin list
//! - **Conflict detection**: a route name may only be defined once
//! - **Fail open**: any configuration problem allows the tool call
//! - **Inline tests**: routes carry example calls that `test` verifies
//! - **Integration evaluation**: export a test plan and score an external report
//!
//! # Example
//!
//! ```
//! use tool_routing::{merge_routes, HookInput, Route, RoutingEngine};
//!
//! let route = Route::new(
//!     "atlassian",
//!     "WebFetch",
//!     r"atlassian\.net",
//!     "Use the Atlassian MCP tools",
//! );
//! let engine = RoutingEngine::new(merge_routes(vec![(vec![route], "example.yaml")]).unwrap());
//!
//! let input = r#"{"tool_name":"WebFetch","tool_input":{"url":"https://acme.atlassian.net/x"}}"#;
//! let result = engine.check(&HookInput::from_json(input).unwrap());
//! assert!(result.blocked);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod input;
pub mod integration;
pub mod matcher;
pub mod merge;
pub mod output;
pub mod routes;

// Re-exports for convenience
pub use config::{Config, Settings};
pub use engine::RoutingEngine;
pub use error::{LoadError, RouteConflict, RoutingUnavailable};
pub use input::{HookInput, ToolKind};
pub use matcher::{check_tool_call, CheckResult};
pub use merge::{merge_routes, RouteSet};
pub use output::{Decision, HookOutput};
pub use routes::{load_routes_file, Expect, Loaded, Route};
