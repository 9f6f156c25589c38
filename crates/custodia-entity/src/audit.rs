//! Audit sinks.
//!
//! Lifecycle changes produce one formatted line each:
//!
//! ```text
//! Project "Survey 2024"[12] has been created by amy@example.com
//! ```

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Log target for audit lines.
pub const AUDIT_TARGET: &str = "custodia::audit";

/// What happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// First save.
    Created,
    /// Save of an entity that already had a key.
    Updated,
    /// Deletion.
    Deleted,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Created => write!(f, "created"),
            AuditAction::Updated => write!(f, "updated"),
            AuditAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// Formats an entity reference as `"label"[id]`.
pub fn format_label(label: &str, id: Option<u64>) -> String {
    let id = id.map(|id| id.to_string()).unwrap_or_default();
    format!("\"{label}\"[{id}]")
}

/// Formats the audit line for one change.
pub fn audit_line(
    type_name: &str,
    label: &str,
    id: Option<u64>,
    action: AuditAction,
    actor: &str,
) -> String {
    format!(
        "{type_name} {} has been {action} by {actor}",
        format_label(label, id)
    )
}

/// Receives formatted audit lines.
pub trait AuditSink: Send + Sync {
    /// Records one line.
    fn record(&self, line: &str);
}

/// Emits audit lines as `tracing` events under [`AUDIT_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, line: &str) {
        tracing::info!(target: AUDIT_TARGET, "{line}");
    }
}

/// Keeps audit lines in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryAuditSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line recorded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}
