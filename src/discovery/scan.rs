//! Filesystem scan for rule files
//!
//! Under each plugin of the plugins directory, rule files live at:
//!
//! ```text
//! <plugin>/hooks/tool-routes.yaml
//! <plugin>/skills/<skill>/tool-routes.yaml
//! <plugin>/skills/<skill>/hooks/tool-routes.yaml
//! <plugin>/<version>/...            (same three, for installed copies)
//! ```
//!
//! Only one version directory per plugin is scanned: the one this plugin
//! runs from, otherwise the highest version. Older copies define the same
//! route names and would conflict.
//!
//! Skills installed outside any plugin live at
//! `<project>/.claude/skills/<skill>/hooks/tool-routes.yaml`.
//! Directories are visited in lexical order.

use std::path::{Path, PathBuf};

use crate::routes::ROUTES_FILE_NAME;

/// Rule files of every plugin under `plugins_dir`. `own_root` is the
/// directory this plugin runs from; it wins over other installed versions.
pub fn scan_plugins(plugins_dir: &Path, own_root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for plugin in sorted_subdirs(plugins_dir) {
        collect_layout(&plugin, &mut found);
        if let Some(version) = select_version(&plugin, own_root) {
            collect_layout(&version, &mut found);
        }
    }

    found
}

/// Whether a directory name looks like an installed version (`1.2.0`, `v2`)
pub fn is_version_name(name: &str) -> bool {
    let digits = name.strip_prefix('v').unwrap_or(name);
    digits.starts_with(|c: char| c.is_ascii_digit())
}

/// The version directory of `plugin` to scan, if it has any
fn select_version(plugin: &Path, own_root: &Path) -> Option<PathBuf> {
    let versions: Vec<PathBuf> = sorted_subdirs(plugin)
        .into_iter()
        .filter(|dir| dir_name(dir).is_some_and(is_version_name))
        .collect();

    if let Some(own) = versions.iter().find(|dir| same_dir(dir, own_root)) {
        return Some(own.clone());
    }

    versions
        .into_iter()
        .max_by(|a, b| version_key(a).cmp(&version_key(b)).then_with(|| a.cmp(b)))
}

/// Numeric components of a version name; non-numeric parts count as 0
fn version_key(dir: &Path) -> Vec<u64> {
    let name = dir_name(dir).unwrap_or("");
    name.strip_prefix('v')
        .unwrap_or(name)
        .split(['.', '-', '+'])
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

fn dir_name(dir: &Path) -> Option<&str> {
    dir.file_name().and_then(|n| n.to_str())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Rule files of skills installed into the project
pub fn scan_external_skills(project_root: &Path) -> Vec<PathBuf> {
    sorted_subdirs(&project_root.join(".claude").join("skills"))
        .into_iter()
        .map(|skill| skill.join("hooks").join(ROUTES_FILE_NAME))
        .filter(|path| path.is_file())
        .collect()
}

/// Rule files directly under one plugin (or version) directory
fn collect_layout(root: &Path, found: &mut Vec<PathBuf>) {
    push_if_file(root.join("hooks").join(ROUTES_FILE_NAME), found);

    for skill in sorted_subdirs(&root.join("skills")) {
        push_if_file(skill.join(ROUTES_FILE_NAME), found);
        push_if_file(skill.join("hooks").join(ROUTES_FILE_NAME), found);
    }
}

fn push_if_file(path: PathBuf, found: &mut Vec<PathBuf>) {
    if path.is_file() {
        found.push(path);
    }
}

/// Subdirectories in lexical order; unreadable directories yield nothing
fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}
