use thiserror::Error;

/// Errors that abort an analysis run before the core executes.
///
/// Statistical edge cases (too few groups, unknown validation methods) are
/// never reported through this type; they resolve to a
/// [`crate::evaluation::Verdict`] on the validation result instead.
#[derive(Error, Debug, Clone)]
pub enum AnalystError {
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Invalid record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("YAML error: {0}")]
    Yaml(String),
}

pub type Result<T> = std::result::Result<T, AnalystError>;

impl From<std::io::Error> for AnalystError {
    fn from(e: std::io::Error) -> Self {
        AnalystError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AnalystError {
    fn from(e: serde_json::Error) -> Self {
        AnalystError::Json(e.to_string())
    }
}

impl From<serde_yaml::Error> for AnalystError {
    fn from(e: serde_yaml::Error) -> Self {
        AnalystError::Yaml(e.to_string())
    }
}

impl AnalystError {
    /// Process exit code (sysexits.h) for the command-line front end.
    pub fn exit_code(&self) -> i32 {
        match self {
            AnalystError::EmptyDataset(_) => 65,
            AnalystError::InvalidRecord { .. } => 65,
            AnalystError::Json(_) => 65,
            AnalystError::Config(_) => 78,
            AnalystError::Yaml(_) => 78,
            AnalystError::Io(_) => 74,
        }
    }
}
