//! Error types and diagnostics
//!
//! Structural problems (unknown names, bad map keys, broken tags, ...) are
//! fatal and surface as [`JsonDocError`]. Problems that only degrade a single
//! hyperlink are collected as [`Diagnostic`]s and the run keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for jsondoc operations
pub type JsonDocResult<T> = Result<T, JsonDocError>;

/// Main error type for jsondoc
#[derive(Debug, Error)]
pub enum JsonDocError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Go source could not be parsed
    #[error("Parse error in {}{}: {message}", .file.display(), .line.map(|l| format!(":{}", l)).unwrap_or_default())]
    Parse {
        file: PathBuf,
        message: String,
        line: Option<usize>,
    },

    /// Identifier absent from the namespace and not a built-in
    #[error("Type {name} not found in package {namespace}")]
    NameNotFound { name: String, namespace: String },

    /// Identifier names a var, const or func
    #[error("Object named {name} in package {namespace} is not a type")]
    NotAType { name: String, namespace: String },

    /// `import` directive used an alias twice
    #[error("Import alias {0:?} is already registered")]
    DuplicateImportAlias(String),

    /// Qualified name used before its alias was imported
    #[error("Package alias {0:?} is not imported (use the import directive before referencing it)")]
    UnregisteredAlias(String),

    /// Map keyed by something other than a string
    #[error("only maps with string keys are supported (found key type {key})")]
    UnsupportedMapKey { key: String },

    /// Struct tag that does not follow the `key:"value"` convention
    #[error("Malformed tag on field {member}: {reason} (tag {tag:?})")]
    MalformedAnnotation {
        member: String,
        tag: String,
        reason: String,
    },

    /// Import path that does not map to a directory with Go sources
    #[error("Package {path} not found: {reason}")]
    PackageNotFound { path: String, reason: String },

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl JsonDocError {
    /// Create a parse error
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        JsonDocError::Parse {
            file: file.into(),
            message: message.into(),
            line: None,
        }
    }

    /// Create a parse error with location
    pub fn parse_at(file: impl Into<PathBuf>, message: impl Into<String>, line: usize) -> Self {
        JsonDocError::Parse {
            file: file.into(),
            message: message.into(),
            line: Some(line),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        JsonDocError::Config(message.into())
    }

    /// Create a package lookup error
    pub fn package_not_found(path: impl Into<String>, reason: impl Into<String>) -> Self {
        JsonDocError::PackageNotFound {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            JsonDocError::Io(_) => "io",
            JsonDocError::Parse { .. } => "parse",
            JsonDocError::NameNotFound { .. } => "name-not-found",
            JsonDocError::NotAType { .. } => "not-a-type",
            JsonDocError::DuplicateImportAlias(_) => "duplicate-import-alias",
            JsonDocError::UnregisteredAlias(_) => "unregistered-alias",
            JsonDocError::UnsupportedMapKey { .. } => "unsupported-map-key",
            JsonDocError::MalformedAnnotation { .. } => "malformed-annotation",
            JsonDocError::PackageNotFound { .. } => "package-not-found",
            JsonDocError::Template(_) => "template",
            JsonDocError::Config(_) => "config",
            JsonDocError::Serialization(_) => "serialization",
        }
    }

    /// Error as a diagnostic, keeping the source location of parse errors
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.to_string()).with_code(self.kind());
        match self {
            JsonDocError::Parse { file, line, .. } => {
                let diagnostic = diagnostic.in_file(file);
                match line {
                    Some(line) => diagnostic.at(*line),
                    None => diagnostic,
                }
            }
            _ => diagnostic,
        }
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Error - the run cannot produce output
    Error,
    /// Warning - output is produced but degraded
    Warning,
    /// Info - informational message
    Info,
}

impl DiagnosticSeverity {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Message
    pub message: String,
    /// Source file
    pub file: Option<PathBuf>,
    /// Line number (1-indexed)
    pub line: Option<usize>,
    /// Diagnostic code (for categorization)
    pub code: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: None,
            line: None,
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Info, message)
    }

    /// Set the source file
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the line
    pub fn at(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Location prefix (`file:line: `), empty when no file is known
    pub fn location(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => format!("{}:{}: ", file.display(), line),
            (Some(file), None) => format!("{}: ", file.display()),
            _ => String::new(),
        }
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        let mut result = self.location();
        result.push_str(self.severity.display());
        if let Some(ref code) = self.code {
            result.push('[');
            result.push_str(code);
            result.push(']');
        }
        result.push_str(": ");
        result.push_str(&self.message);
        result
    }
}

/// Collector for diagnostics during one generation run
#[derive(Debug, Default, Clone)]
pub struct DiagnosticsCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic, mirroring it to the log
    pub fn add(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            DiagnosticSeverity::Error => tracing::error!("{}", diagnostic.format()),
            DiagnosticSeverity::Warning => tracing::warn!("{}", diagnostic.format()),
            DiagnosticSeverity::Info => tracing::debug!("{}", diagnostic.format()),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get warning count
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .count()
    }
}
