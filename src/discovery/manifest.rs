//! Rule files declared by plugin manifests
//!
//! Each plugin may ship `.claude-plugin/routes.json`:
//!
//! ```json
//! {"routes": ["hooks/tool-routes.yaml", "skills/pr/tool-routes.yaml"]}
//! ```
//!
//! Entries are relative to the plugin's install path. Entries that do not
//! exist are dropped, as are manifests that cannot be read.
//!
//! Absolute entries are ignored rather than resolved as-is. A manifest only
//! declares files the plugin ships; an absolute path could point a plugin at
//! another plugin's or the user's rule files.

use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::host::PluginRecord;

/// Manifest location relative to a plugin's install path
pub const MANIFEST_PATH: &str = ".claude-plugin/routes.json";

/// Contents of a plugin's routes manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutesManifest {
    #[serde(default)]
    pub routes: Vec<String>,
}

impl RoutesManifest {
    /// Read the manifest of the plugin installed at `install_path`
    pub fn read(install_path: &Path) -> Option<Self> {
        let path = install_path.join(MANIFEST_PATH);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                debug!("ignoring malformed manifest {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Existing rule files declared by the plugins' manifests, sorted
pub fn manifest_route_files(plugins: &[PluginRecord]) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for plugin in plugins {
        let Some(install_path) = plugin.install_path.as_deref() else {
            continue;
        };
        let Some(manifest) = RoutesManifest::read(install_path) else {
            continue;
        };

        for entry in &manifest.routes {
            if Path::new(entry).is_absolute() {
                debug!("ignoring absolute manifest entry '{}' in {}", entry, plugin.id);
                continue;
            }
            let path = install_path.join(entry);
            if path.is_file() {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}
