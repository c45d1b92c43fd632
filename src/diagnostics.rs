//! Diagnostic log returned alongside a massing.
//!
//! Each entry is also emitted as a `tracing` event, so a caller with a
//! subscriber installed sees the same messages as the returned log.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Pipeline step that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Config,
    Dimensions,
    Stories,
    Slicing,
    Extrusion,
    Reconciliation,
    Fenestration,
    Validation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Config => "config",
            Stage::Dimensions => "dimensions",
            Stage::Stories => "stories",
            Stage::Slicing => "slicing",
            Stage::Extrusion => "extrusion",
            Stage::Reconciliation => "reconciliation",
            Stage::Fenestration => "fenestration",
            Stage::Validation => "validation",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.stage, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(%stage, "{message}");
        self.push(Severity::Info, stage, message);
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%stage, "{message}");
        self.push(Severity::Warning, stage, message);
    }

    pub fn error(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(%stage, "{message}");
        self.push(Severity::Error, stage, message);
    }

    fn push(&mut self, severity: Severity, stage: Stage, message: String) {
        self.entries.push(Diagnostic {
            severity,
            stage,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    pub fn has_errors(&self) -> bool {
        self.with_severity(Severity::Error).next().is_some()
    }

    /// True if some entry of `severity` mentions `needle` (case-insensitive).
    pub fn mentions(&self, severity: Severity, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.with_severity(severity)
            .any(|d| d.message.to_lowercase().contains(&needle))
    }
}
