//! Scene document error types.

use std::path::PathBuf;

/// Errors that can occur when loading or parsing a scene document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the scene file from disk.
    #[error("failed to read scene {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse RON content.
    #[error("failed to parse scene: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize a scene to RON.
    #[error("failed to serialize scene: {0}")]
    SerializeError(#[source] ron::Error),

    /// A value is outside its allowed range.
    #[error("invalid scene: {0}")]
    Invalid(String),
}
