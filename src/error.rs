//! Error types for tool-routing
//!
//! Two families live here. Authoring errors (`LoadError`, `RouteConflict`)
//! are reported loudly by `list`/`test`, while `check` turns every one of
//! them into an allow. Host and evaluation errors describe why an external
//! input could not be used.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A rule file parsed but one of its entries is malformed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// An entry under `routes` is missing a required field or has a bad value
    #[error("invalid route '{name}' in {}: {source}", path.display())]
    InvalidRoute {
        path: PathBuf,
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A key under `routes` is not a string
    #[error("invalid route name in {}: route names must be strings", path.display())]
    InvalidName { path: PathBuf },
}

/// The same route name is defined by two sources.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Route conflict: '{name}' defined in both {first} and {second}")]
pub struct RouteConflict {
    pub name: String,
    pub first: String,
    pub second: String,
}

/// Why no usable rule set could be built.
#[derive(Debug, Error)]
pub enum RoutingUnavailable {
    #[error(transparent)]
    Conflict(#[from] RouteConflict),

    #[error(transparent)]
    InvalidSource(#[from] LoadError),
}

/// Failure querying the host for its enabled plugins.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("failed to read output of '{program}': {source}")]
    Read {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Failed { program: String, status: String },

    #[error("malformed plugin list: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Integration evaluation could not read its inputs.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
