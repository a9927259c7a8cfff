//! Error types for novx.

use thiserror::Error;

/// Top-level result type for novx operations.
pub type Result<T> = std::result::Result<T, NovxError>;

/// Top-level error type for novx.
///
/// Fatal errors carry the offending file path in their message; everything
/// recoverable (dangling references, malformed date values) is healed in
/// place and never surfaces here.
#[derive(Debug, Error)]
pub enum NovxError {
    #[error("no valid version found in \"{0}\"")]
    MissingVersion(String),

    #[error("the project \"{0}\" was created with a newer application version")]
    NewerVersion(String),

    #[error("the project \"{0}\" was created with an outdated application version")]
    OlderVersion(String),

    #[error("cannot parse \"{path}\": {message}")]
    MalformedXml { path: String, message: String },

    #[error("cannot overwrite \"{0}\"")]
    BackupFailed(String),

    #[error("cannot write \"{0}\"")]
    WriteFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
