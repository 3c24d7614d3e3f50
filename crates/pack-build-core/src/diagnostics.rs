//! Diagnostic extraction from Rolldown errors and warnings.
//!
//! Rolldown's diagnostic types are not stable across releases, so we read
//! their formatted output and keep only what the pipeline needs: a kind, a
//! severity, the message, and for unresolved imports the offending specifier.

use serde::{Deserialize, Serialize};

/// Extracted diagnostic information from Rolldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    /// Import specifier for [`DiagnosticKind::UnresolvedImport`].
    pub specifier: Option<String>,
    pub help: Option<String>,
}

/// Diagnostic kind (mirrors the Rolldown event kinds we care about).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnresolvedImport,
    UnresolvedEntry,
    MissingExport,
    MissingGlobalName,
    CircularDependency,
    ParseError,
    Plugin,
    Transform,
    Other(String),
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl ExtractedDiagnostic {
    /// Create an error-severity diagnostic with only a kind and message.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            file: None,
            specifier: None,
            help: None,
        }
    }

    /// Create an unresolved-import warning for `specifier`.
    pub fn unresolved_import(specifier: impl Into<String>, from_file: Option<String>) -> Self {
        let specifier = specifier.into();
        Self {
            kind: DiagnosticKind::UnresolvedImport,
            severity: DiagnosticSeverity::Warning,
            message: format!("Could not resolve '{}'", specifier),
            file: from_file,
            specifier: Some(specifier),
            help: None,
        }
    }

    pub fn with_severity(mut self, severity: DiagnosticSeverity) -> Self {
        self.severity = severity;
        self
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::UnresolvedImport => write!(f, "UnresolvedImport"),
            DiagnosticKind::UnresolvedEntry => write!(f, "UnresolvedEntry"),
            DiagnosticKind::MissingExport => write!(f, "MissingExport"),
            DiagnosticKind::MissingGlobalName => write!(f, "MissingGlobalName"),
            DiagnosticKind::CircularDependency => write!(f, "CircularDependency"),
            DiagnosticKind::ParseError => write!(f, "ParseError"),
            DiagnosticKind::Plugin => write!(f, "Plugin"),
            DiagnosticKind::Transform => write!(f, "Transform"),
            DiagnosticKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Extract diagnostics from a Rolldown error batch.
pub fn extract_from_rolldown_error(error: &dyn std::fmt::Debug) -> Vec<ExtractedDiagnostic> {
    let error_str = format!("{error:?}");

    let parts: Vec<&str> = error_str
        .split("BatchedBuildDiagnostic")
        .filter(|s| !s.trim().is_empty())
        .collect();

    if parts.len() > 1 {
        parts.iter().map(|part| extract_single_from_string(part)).collect()
    } else {
        vec![extract_single_from_string(&error_str)]
    }
}

/// Extract a warning from a single Rolldown diagnostic.
pub fn extract_warning(warning: &dyn std::fmt::Debug) -> ExtractedDiagnostic {
    extract_single_from_string(&format!("{warning:?}"))
        .with_severity(DiagnosticSeverity::Warning)
}

fn extract_single_from_string(error_str: &str) -> ExtractedDiagnostic {
    let kind = classify(error_str);

    let severity = if error_str.contains("warning") || error_str.contains("Warning") {
        DiagnosticSeverity::Warning
    } else {
        DiagnosticSeverity::Error
    };

    let specifier = match kind {
        DiagnosticKind::UnresolvedImport => extract_quoted_string_after(error_str, "resolve")
            .or_else(|| extract_quoted_string_after(error_str, "import")),
        _ => None,
    };

    let help = match kind {
        DiagnosticKind::UnresolvedImport => Some(
            "Relative imports must point at files that exist in dist-src/. \
             Bare package imports that cannot be found are left external."
                .to_string(),
        ),
        DiagnosticKind::MissingGlobalName => Some(
            "External imports in UMD/IIFE bundles are read from globals with a guessed name."
                .to_string(),
        ),
        _ => extract_help_text(error_str),
    };

    ExtractedDiagnostic {
        kind,
        severity,
        message: error_str.trim().to_string(),
        file: extract_file_path(error_str),
        specifier,
        help,
    }
}

fn classify(error_str: &str) -> DiagnosticKind {
    if error_str.contains("UnresolvedImport")
        || error_str.contains("UNRESOLVED_IMPORT")
        || error_str.contains("Could not resolve")
        || error_str.contains("Cannot resolve")
    {
        DiagnosticKind::UnresolvedImport
    } else if error_str.contains("UnresolvedEntry") || error_str.contains("UNRESOLVED_ENTRY") {
        DiagnosticKind::UnresolvedEntry
    } else if error_str.contains("MissingGlobalName") || error_str.contains("MISSING_GLOBAL_NAME")
    {
        DiagnosticKind::MissingGlobalName
    } else if error_str.contains("MissingExport") || error_str.contains("MISSING_EXPORT") {
        DiagnosticKind::MissingExport
    } else if error_str.contains("Circular") || error_str.contains("CIRCULAR_DEPENDENCY") {
        DiagnosticKind::CircularDependency
    } else if error_str.contains("Parse error")
        || error_str.contains("PARSE_ERROR")
        || error_str.contains("Expected")
    {
        DiagnosticKind::ParseError
    } else if error_str.contains("Plugin") {
        DiagnosticKind::Plugin
    } else if error_str.contains("Transform") || error_str.contains("transform") {
        DiagnosticKind::Transform
    } else {
        DiagnosticKind::Other("Bundler".to_string())
    }
}

fn extract_file_path(text: &str) -> Option<String> {
    for ext in &[".js", ".mjs", ".cjs", ".json", ".ts", ".jsx", ".tsx"] {
        if let Some(pos) = text.find(ext) {
            let before = &text[..pos + ext.len()];
            for indicator in &["in ", "at ", "file: ", "path: ", "\"", "'"] {
                if let Some(start) = before.rfind(indicator) {
                    let path_str = &before[start + indicator.len()..];
                    if !path_str.is_empty() && !path_str.contains(char::is_whitespace) {
                        return Some(path_str.to_string());
                    }
                }
            }
        }
    }
    None
}

fn extract_help_text(text: &str) -> Option<String> {
    for indicator in &["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(indicator) {
            let help_str = text[pos + indicator.len()..]
                .lines()
                .next()
                .unwrap_or("")
                .trim();
            if !help_str.is_empty() {
                return Some(help_str.to_string());
            }
        }
    }
    None
}

fn extract_quoted_string_after(text: &str, keyword: &str) -> Option<String> {
    let pos = text.find(keyword)?;
    extract_quoted_string(&text[pos + keyword.len()..])
}

/// Extract the first quoted string (single, double, or backtick).
fn extract_quoted_string(text: &str) -> Option<String> {
    let (start, quote) = text.char_indices().find(|(_, c)| matches!(c, '"' | '\'' | '`'))?;
    let after = &text[start + 1..];
    let end = after.find(quote)?;
    Some(after[..end].to_string())
}
