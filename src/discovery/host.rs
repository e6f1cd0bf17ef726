//! Enabled-plugin enumeration from the host
//!
//! [`PluginHost`] is the seam discovery uses to ask which plugins are
//! enabled. [`CommandHost`] runs the host's CLI under a hard timeout; a
//! slow, failing or garbled host is an error the caller degrades on.

use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::error::HostError;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Installation scope of a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginScope {
    User,
    Managed,
    Project,
    Local,
    #[serde(other)]
    Unknown,
}

/// One entry of the host's plugin list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub scope: Option<PluginScope>,

    #[serde(default)]
    pub install_path: Option<PathBuf>,

    /// Project a project/local-scoped plugin is enabled for
    #[serde(default)]
    pub project_path: Option<PathBuf>,
}

impl PluginRecord {
    /// Whether this plugin applies to `project_root`: user and managed
    /// plugins always do, project and local ones only for their project
    pub fn visible_in(&self, project_root: &Path) -> bool {
        match self.scope {
            Some(PluginScope::User) | Some(PluginScope::Managed) => true,
            Some(PluginScope::Project) | Some(PluginScope::Local) => {
                self.project_path.as_deref() == Some(project_root)
            }
            Some(PluginScope::Unknown) | None => false,
        }
    }
}

/// Source of the enabled-plugin list
pub trait PluginHost {
    fn enabled_plugins(&self) -> Result<Vec<PluginRecord>, HostError>;
}

/// Enabled plugins visible in `project_root`, first entry per install path
pub fn visible_plugins(plugins: Vec<PluginRecord>, project_root: &Path) -> Vec<PluginRecord> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    plugins
        .into_iter()
        .filter(|p| p.enabled && p.visible_in(project_root))
        .filter(|p| match &p.install_path {
            Some(path) => seen.insert(path.clone()),
            None => false,
        })
        .collect()
}

/// Host backed by an external command printing a JSON plugin array
#[derive(Debug, Clone)]
pub struct CommandHost {
    command: Vec<String>,
    timeout: Duration,
}

impl CommandHost {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    /// Host configured by `host_command` and `host_timeout`
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.host_command.clone(), settings.host_timeout)
    }
}

impl PluginHost for CommandHost {
    fn enabled_plugins(&self) -> Result<Vec<PluginRecord>, HostError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(HostError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty host command"),
            });
        };

        let started = Instant::now();
        let stdout = run_with_timeout(program, args, self.timeout)?;
        debug!(
            "'{}' listed plugins in {}ms",
            program,
            started.elapsed().as_millis()
        );
        Ok(serde_json::from_slice(&stdout)?)
    }
}

/// Run a command and collect its stdout, killing it at `timeout`.
fn run_with_timeout(program: &str, args: &[String], timeout: Duration) -> Result<Vec<u8>, HostError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| HostError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let Some(mut stdout) = child.stdout.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(HostError::Read {
            program: program.to_string(),
            source: std::io::Error::other("stdout not captured"),
        });
    };

    // Drain stdout on a helper thread so a full pipe cannot stall the child.
    let reader = thread::spawn(move || {
        let mut output = Vec::new();
        stdout.read_to_end(&mut output).map(|_| output)
    });

    let deadline = Instant::now() + timeout;
    let timed_out = || HostError::Timeout {
        program: program.to_string(),
        timeout,
    };

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(source) => {
                let _ = child.kill();
                return Err(HostError::Read {
                    program: program.to_string(),
                    source,
                });
            }
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(timed_out());
        }
        thread::sleep(POLL_INTERVAL);
    };

    if !status.success() {
        return Err(HostError::Failed {
            program: program.to_string(),
            status: status.to_string(),
        });
    }

    // A descendant may still hold the pipe open; do not wait past the deadline.
    while !reader.is_finished() {
        if Instant::now() >= deadline {
            return Err(timed_out());
        }
        thread::sleep(POLL_INTERVAL);
    }

    match reader.join() {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(HostError::Read {
            program: program.to_string(),
            source,
        }),
        Err(_) => Err(HostError::Read {
            program: program.to_string(),
            source: std::io::Error::other("reader thread panicked"),
        }),
    }
}
