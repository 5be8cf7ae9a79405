//! Error types for the illustration coach
//!
//! Structured error definitions use thiserror; anyhow errors from the binary's
//! glue are folded into [`CoachError::Other`].

use thiserror::Error;

/// Main error type for illustcoach operations
#[derive(Error, Debug)]
pub enum CoachError {
    /// No API key configured; the evaluation must not be attempted
    #[error("API key not configured. Set GOOGLE_API_KEY or ILLUSTCOACH_API_KEY")]
    MissingCredential,

    /// The generation API call failed or returned unusable content
    #[error("Evaluation failed: {0}")]
    ExternalCallFailure(String),

    /// The history database could not be opened, read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Request is malformed (wrong image count, bad base64, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Image bytes could not be decoded or encoded
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl CoachError {
    /// Stable machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            CoachError::MissingCredential => "missing_credential",
            CoachError::ExternalCallFailure(_) => "external_call_failure",
            CoachError::StorageUnavailable(_) => "storage_unavailable",
            CoachError::InvalidInput(_) => "invalid_input",
            CoachError::InvalidImage(_) => "invalid_image",
            CoachError::Config(_) => "config",
            CoachError::Io(_) => "io",
            CoachError::Serialization(_) => "serialization",
            CoachError::Other(_) => "other",
        }
    }
}

/// Result type alias for illustcoach operations
pub type Result<T> = std::result::Result<T, CoachError>;

/// Convert anyhow::Error to CoachError
impl From<anyhow::Error> for CoachError {
    fn from(err: anyhow::Error) -> Self {
        CoachError::Other(err.to_string())
    }
}

impl From<rusqlite::Error> for CoachError {
    fn from(err: rusqlite::Error) -> Self {
        CoachError::StorageUnavailable(err.to_string())
    }
}

impl From<image::ImageError> for CoachError {
    fn from(err: image::ImageError) -> Self {
        CoachError::InvalidImage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoachError::StorageUnavailable("disk full".to_string());
        assert_eq!(err.to_string(), "Storage unavailable: disk full");
        assert_eq!(err.kind(), "storage_unavailable");
    }

    #[test]
    fn test_sqlite_error_maps_to_storage_unavailable() {
        let sqlite_err = rusqlite::Connection::open_in_memory()
            .unwrap()
            .execute("INSERT INTO missing_table VALUES (1)", [])
            .unwrap_err();

        let err: CoachError = sqlite_err.into();
        assert!(matches!(err, CoachError::StorageUnavailable(_)));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: CoachError = anyhow::anyhow!("bad address").into();
        assert!(matches!(err, CoachError::Other(ref m) if m == "bad address"));
    }
}
