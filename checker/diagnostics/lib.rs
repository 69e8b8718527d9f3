use checker__source::{Position, Span};

/// A front-end diagnostic: lexer and parser errors are reported against a
/// span of the file being parsed.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A diagnostic emitted by an analyzer pass. The position carries the file,
/// which the driver maps back to a path when rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisDiagnostic {
    pub analyzer: &'static str,
    pub position: Position,
    pub message: String,
}

impl AnalysisDiagnostic {
    pub fn new(analyzer: &'static str, position: Position, message: impl Into<String>) -> Self {
        Self {
            analyzer,
            position,
            message: message.into(),
        }
    }
}
