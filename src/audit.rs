//! JSONL decision log for tool-routing
//!
//! In debug mode every `check` decision is appended to a JSONL file for
//! later analysis. Logging is best-effort and never changes a decision.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::input::HookInput;
use crate::output::Decision;

/// Log level for decision entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Allowed,
    Blocked,
    Unavailable,
}

/// A decision log entry
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    /// Timestamp of the decision
    pub timestamp: DateTime<Utc>,

    /// ALLOWED, BLOCKED or UNAVAILABLE
    pub level: LogLevel,

    /// Tool that was invoked
    pub tool: String,

    /// Route that matched (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    /// Summary of the input
    pub input_summary: String,

    /// Reason for the decision
    pub reason: String,

    /// Session ID (if provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AuditEntry {
    /// Create a new entry from input and decision
    pub fn new(input: &HookInput, decision: &Decision) -> Self {
        let level = match decision {
            Decision::Allow { .. } => LogLevel::Allowed,
            Decision::Block { .. } => LogLevel::Blocked,
            Decision::Unavailable { .. } => LogLevel::Unavailable,
        };

        Self {
            timestamp: Utc::now(),
            level,
            tool: input.tool_name.clone(),
            route: decision.route_name().map(String::from),
            input_summary: input.summary(),
            reason: decision.reason().to_string(),
            session_id: input.session_id.clone(),
        }
    }
}

/// Decision logger
#[derive(Default)]
pub struct AuditLogger {
    writer: Option<BufWriter<File>>,
}

impl AuditLogger {
    /// Open the log at `path`, or a disabled logger for `None` or when
    /// the file cannot be opened
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .ok()
                .map(BufWriter::new)
        });

        Self { writer }
    }

    /// Append one entry
    pub fn log(&mut self, entry: &AuditEntry) -> Result<(), std::io::Error> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Log a decision
    pub fn log_decision(
        &mut self,
        input: &HookInput,
        decision: &Decision,
    ) -> Result<(), std::io::Error> {
        let entry = AuditEntry::new(input, decision);
        self.log(&entry)
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}
