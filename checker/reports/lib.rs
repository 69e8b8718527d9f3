use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format for both diagnostics (stdout) and failures (stderr).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 2] = [ReportFormat::Text, ReportFormat::Json];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    /// The full stdout report, newline-terminated when non-empty.
    pub fn render_diagnostics(
        self,
        diagnostics: &[RenderedDiagnostic],
    ) -> Result<String, serde_json::Error> {
        match self {
            Self::Text => Ok(render_text(diagnostics)),
            Self::Json => render_json(diagnostics).map(|json| json + "\n"),
        }
    }

    /// Falls back to text if the failure cannot be encoded.
    #[must_use]
    pub fn render_failure(self, failure: &CheckFailure) -> String {
        match self {
            Self::Text => render_failure_text(failure),
            Self::Json => render_failure_json(failure)
                .map_or_else(|_| render_failure_text(failure), |json| json + "\n"),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    /// Case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.into_iter().map(Self::name).collect();
                format!(
                    "unknown report format '{value}' (expected one of: {})",
                    names.join(", ")
                )
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDiagnostic {
    pub analyzer: String,
    pub path: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CheckFailure {
    pub kind: CheckFailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<CheckFailureDetail>,
}

impl CheckFailure {
    pub fn new(kind: CheckFailureKind, message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path,
            details: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckFailureKind {
    ReadSource,
    WorkspaceNotFound,
    WorkspaceDiscoveryFailed,
    InvalidPackagePattern,
    ParseFailed,
    PackageClauseMismatch,
    ImportCycle,
    AnalysisFailed,
}

#[derive(Clone, Debug, Serialize)]
pub struct CheckFailureDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// `<path>:<line>:<column>: <message>`, one diagnostic per line.
#[must_use]
pub fn render_text(diagnostics: &[RenderedDiagnostic]) -> String {
    let mut output = String::new();
    for diagnostic in diagnostics {
        output.push_str(&format!(
            "{}:{}:{}: {}\n",
            diagnostic.path, diagnostic.line, diagnostic.column, diagnostic.message
        ));
    }
    output
}

pub fn render_json(diagnostics: &[RenderedDiagnostic]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(diagnostics)
}

#[must_use]
pub fn render_failure_text(failure: &CheckFailure) -> String {
    let mut output = match &failure.path {
        Some(path) => format!("error: {path}: {}\n", failure.message),
        None => format!("error: {}\n", failure.message),
    };
    for detail in &failure.details {
        match &detail.path {
            Some(path) => output.push_str(&format!("  {path}: {}\n", detail.message)),
            None => output.push_str(&format!("  {}\n", detail.message)),
        }
    }
    output
}

pub fn render_failure_json(failure: &CheckFailure) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(failure)
}
