use serde::Serialize;

use crate::error::ConvertError;

pub const E_LINK_MALFORMED: &str = "E_LINK_MALFORMED";

pub const W_INVALID_UTF8: &str = "W_INVALID_UTF8";

/// A per-line problem reported by the stream driver. An error skips the
/// offending line; a warning leaves it converted. Either way the run goes on.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    /// 1-based line number in the source.
    pub line: usize,
    /// 1-based character column within the line.
    pub column: usize,
    pub severity: DiagnosticSeverity,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        line: usize,
        column: usize,
        severity: DiagnosticSeverity,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            column,
            severity,
            code,
            message: message.into(),
        }
    }

    pub fn from_convert_error(line: usize, err: &ConvertError) -> Self {
        Self::new(
            line,
            err.column(),
            DiagnosticSeverity::Error,
            err.code(),
            err.to_string(),
        )
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl DiagnosticSeverity {
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        }
    }
}
