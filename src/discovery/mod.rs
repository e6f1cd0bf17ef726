//! Rule file discovery
//!
//! Produces the ordered, duplicate-free list of rule files to load:
//! this plugin's own file first, then plugin-contributed files from the
//! configured strategy, then the project-local file last. An explicit
//! override list replaces all of this; isolation keeps only the own file.

pub mod host;
pub mod manifest;
pub mod scan;

use log::debug;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::config::{DiscoveryStrategy, Settings};

pub use host::{CommandHost, PluginHost, PluginRecord, PluginScope};

/// Rule files to load, in match-priority order
pub fn discover_route_files(settings: &Settings, host: &dyn PluginHost) -> Vec<PathBuf> {
    if let Some(paths) = &settings.routes_override {
        debug!("using {} explicit rule file(s)", paths.len());
        return dedupe(paths.clone());
    }

    let mut files = Vec::new();

    let own = settings.own_routes_file();
    if own.is_file() {
        files.push(own);
    }

    if settings.isolated {
        return dedupe(files);
    }

    match settings.strategy {
        DiscoveryStrategy::Scan => {
            files.extend(scan::scan_plugins(&settings.plugins_dir, &settings.plugin_root));
            files.extend(scan::scan_external_skills(&settings.project_root));
        }
        DiscoveryStrategy::Manifest => match host.enabled_plugins() {
            Ok(plugins) => {
                let visible = host::visible_plugins(plugins, &settings.project_root);
                debug!("{} enabled plugin(s) visible", visible.len());
                files.extend(manifest::manifest_route_files(&visible));
            }
            Err(e) => debug!("no plugin routes, host plugin list unavailable: {}", e),
        },
    }

    let project = settings.project_routes_file();
    if project.is_file() {
        files.push(project);
    }

    let files = dedupe(files);
    for file in &files {
        debug!("rule file: {}", file.display());
    }
    files
}

/// Keep the first occurrence of each file, comparing canonical paths
fn dedupe(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(std::fs::canonicalize(path).unwrap_or_else(|_| path.clone())))
        .collect()
}
