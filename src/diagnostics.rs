//! Recoverable diagnostics. Each is logged through `tracing` as it happens
//! and also kept on the session for reporting.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    UnresolvedImport,
    NonEmbeddableExtension,
    PatternMatchEmpty,
    InclusionDenied,
    IncludeFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
