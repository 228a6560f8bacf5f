//! Error types for AtlasTree
//!
//! Provides a unified error type for tree, codec and persistence operations.

use thiserror::Error;

/// Result type alias using AtlasError
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Unified error type for AtlasTree operations
#[derive(Debug, Error)]
pub enum AtlasError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Read or write failure on the caller's stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    /// The value codec failed for the item stored under `key`
    #[error("Codec error for key {key:?}: {source}")]
    Codec {
        key: String,
        #[source]
        source: CodecError,
    },

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    /// The stream does not describe a well-formed tree
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Structural Errors
    // -------------------------------------------------------------------------
    #[error("Invariant violated: {0}")]
    Invariant(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised by a [`ValueCodec`](crate::codec::ValueCodec)
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes on the stream are not a valid encoding
    #[error("Invalid value encoding: {0}")]
    Invalid(String),

    /// The value has no representation in this codec
    #[error("Value cannot be encoded: {0}")]
    Unrepresentable(String),
}

impl AtlasError {
    /// Attach key context to a codec failure.
    ///
    /// A codec that ran off the end of the stream is reported as a format
    /// error, and other stream failures surface as plain I/O errors, so
    /// callers only see `Codec` for genuine encode/decode problems.
    pub(crate) fn from_codec(key: &[u8], err: CodecError) -> Self {
        match err {
            CodecError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                AtlasError::Format(format!(
                    "unexpected end of stream in value for key {:?}",
                    String::from_utf8_lossy(key)
                ))
            }
            CodecError::Io(e) => AtlasError::Io(e),
            other => AtlasError::Codec {
                key: String::from_utf8_lossy(key).into_owned(),
                source: other,
            },
        }
    }
}
