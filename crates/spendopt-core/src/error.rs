//! Error types for spendopt-core
//!
//! The engine itself never fails; these errors cover the edges that touch the
//! outside world (history files, configuration, campaign lookup).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for spendopt operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported history format for {path} (expected .json or .csv)")]
    UnsupportedFormat { path: PathBuf },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed CSV line {line_number} in {path}: {message}")]
    CsvParse {
        path: PathBuf,
        line_number: usize,
        message: String,
    },

    // ===================
    // Config Errors
    // ===================
    #[error("Failed to parse config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ===================
    // Store Errors
    // ===================
    #[error("Campaign not found: {campaign}")]
    CampaignNotFound { campaign: String },
}

/// How much of a history file a load problem cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// One row was dropped, the rest of the file loaded
    Warning,
    /// The whole file was rejected
    Error,
}

/// One problem recorded while loading history
#[derive(Debug, Clone)]
pub struct LoadError {
    /// File (or other input) the problem came from
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Shell command or hint the user can act on
    pub suggestion: Option<String>,
}

impl LoadError {
    fn new(source: impl Into<String>, message: impl Into<String>, severity: ErrorSeverity) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity,
            suggestion: None,
        }
    }

    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source, message, ErrorSeverity::Warning)
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source, message, ErrorSeverity::Error)
    }

    /// Rejected-file entry for a parse or IO failure, with a hint where one helps
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        let message = match error {
            CoreError::FileRead { path, .. } => format!("Cannot read file: {}", path.display()),
            CoreError::JsonParse { path, message, .. } => {
                format!("Invalid JSON in {}: {}", path.display(), message)
            }
            CoreError::UnsupportedFormat { path } => {
                format!("Unsupported history file: {}", path.display())
            }
            _ => error.to_string(),
        };

        Self {
            suggestion: suggestion_for(error),
            ..Self::error(source, message)
        }
    }
}

fn suggestion_for(error: &CoreError) -> Option<String> {
    match error {
        CoreError::FileNotFound { path } => {
            Some(format!("Check if file exists: ls {}", path.display()))
        }
        CoreError::FileRead { path, .. } => {
            Some(format!("Check permissions: chmod +r {}", path.display()))
        }
        CoreError::JsonParse { .. } => Some("Validate JSON syntax with: jq . <file>".to_string()),
        CoreError::CsvParse {
            path, line_number, ..
        } => Some(format!("Inspect line: sed -n '{}p' {}", line_number, path.display())),
        CoreError::UnsupportedFormat { .. } => {
            Some("Export history as .json or .csv (date,adSpend,leads)".to_string())
        }
        _ => None,
    }
}

/// Problems met while loading history, plus what still made it in
///
/// Bad rows are skipped and recorded as warnings so one typo in an export does
/// not hide a campaign's whole history.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    pub files_loaded: usize,
    pub points_loaded: usize,
    pub rows_skipped: usize,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LoadError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Warning)
    }
}
