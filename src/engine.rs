//! Routing engine for tool-routing
//!
//! Ties discovery, loading and merging together into one rule set that
//! tool calls are checked against.

use log::{debug, warn};
use std::path::PathBuf;

use crate::config::Settings;
use crate::discovery::{discover_route_files, PluginHost};
use crate::error::RoutingUnavailable;
use crate::input::HookInput;
use crate::matcher::{check_tool_call, CheckResult};
use crate::merge::{merge_routes, RouteSet};
use crate::routes::{load_routes_file, Loaded, Unavailable};

/// The merged rule set for one process
#[derive(Debug, Clone, Default)]
pub struct RoutingEngine {
    routes: RouteSet,
}

impl RoutingEngine {
    /// Engine over an already merged set
    pub fn new(routes: RouteSet) -> Self {
        Self { routes }
    }

    /// Discover, load and merge every rule file
    pub fn load(settings: &Settings, host: &dyn PluginHost) -> Result<Self, RoutingUnavailable> {
        let files = discover_route_files(settings, host);
        Self::from_files(&files)
    }

    /// Load and merge the given rule files, in order
    pub fn from_files(files: &[PathBuf]) -> Result<Self, RoutingUnavailable> {
        let mut sources = Vec::with_capacity(files.len());
        for file in files {
            match load_routes_file(file)? {
                Loaded::Routes(routes) => sources.push((routes, file.display().to_string())),
                Loaded::Unavailable(Unavailable::Missing) => {
                    debug!("skipping {}: file not found", file.display());
                }
                Loaded::Unavailable(reason) => {
                    warn!("skipping {}: {}", file.display(), reason);
                }
            }
        }

        let routes = merge_routes(sources)?;
        debug!("{} route(s) loaded", routes.len());
        Ok(Self { routes })
    }

    /// Check a tool call
    pub fn check(&self, input: &HookInput) -> CheckResult {
        check_tool_call(input, &self.routes)
    }

    pub fn routes(&self) -> &RouteSet {
        &self.routes
    }
}
