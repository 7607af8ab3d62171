//! The append-only run log.
//!
//! Every executed tool call produces exactly one [`ToolResult`] appended
//! here. Entries are never removed or edited; appends are atomic per entry
//! behind a plain lock. The logbook can render itself to markdown for later
//! diagnosis, including after fatal errors.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::Result;
use crate::tool::result::ToolResult;

/// An append-only record of every tool result produced during a run.
pub struct Logbook {
    started: DateTime<Utc>,
    entries: Mutex<Vec<ToolResult>>,
}

impl Logbook {
    /// Create an empty logbook stamped with the current time.
    pub fn new() -> Self {
        Self {
            started: Utc::now(),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// When this logbook was created.
    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    /// Append one result. Atomic per entry.
    pub fn append(&self, result: ToolResult) {
        self.entries.lock().expect("logbook lock").push(result);
    }

    /// Snapshot of all entries in append order.
    pub fn results(&self) -> Vec<ToolResult> {
        self.entries.lock().expect("logbook lock").clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("logbook lock").len()
    }

    /// True when nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The worst (non-zero wins) exit code observed, or 0.
    pub fn worst_code(&self) -> i32 {
        self.entries
            .lock()
            .expect("logbook lock")
            .iter()
            .map(|entry| entry.code)
            .max_by_key(|code| if *code == 0 { -1 } else { code.abs() })
            .unwrap_or(0)
    }

    /// Render the logbook as markdown.
    pub fn to_markdown(&self) -> String {
        let entries = self.results();
        let mut markdown = String::from("# Cairn Logbook\n\n");
        markdown.push_str(&format!(
            "Started {}\n\n",
            self.started.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));

        markdown.push_str("## Tool runs\n\n");
        if entries.is_empty() {
            markdown.push_str("No tools were run.\n");
            return markdown;
        }
        markdown.push_str("| Code | Duration | Tool | Arguments |\n");
        markdown.push_str("|-----:|---------:|------|-----------|\n");
        for entry in &entries {
            markdown.push_str(&format!(
                "| {} | {:?} | {} | {} |\n",
                entry.code,
                entry.duration,
                entry.name,
                entry.arguments.join(" ")
            ));
        }

        let failures: Vec<&ToolResult> = entries.iter().filter(|e| !e.is_success()).collect();
        if !failures.is_empty() {
            markdown.push_str("\n## Failures\n");
            for failure in failures {
                markdown.push_str(&format!("\n### {} (code {})\n", failure.name, failure.code));
                if !failure.output.is_empty() {
                    markdown.push_str(&format!("\n```\n{}\n```\n", failure.output.trim_end()));
                }
                if !failure.errors.is_empty() {
                    markdown.push_str(&format!("\n```\n{}\n```\n", failure.errors.trim_end()));
                }
            }
        }
        markdown
    }

    /// Write the markdown rendering to a file, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_markdown())?;
        tracing::debug!(path = %path.display(), entries = self.len(), "logbook written");
        Ok(())
    }
}

impl Default for Logbook {
    fn default() -> Self {
        Self::new()
    }
}
