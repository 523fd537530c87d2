//! Error types for chunk-dl
//!
//! This module provides the error taxonomy for the library:
//! - Start-time configuration validation failures
//! - Structural manifest inconsistencies discovered during normalization
//! - Bad download-call arguments (missing/unknown file name)
//! - Per-chunk fetch failures that abort an in-flight download

use thiserror::Error;

/// Result type alias for chunk-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for chunk-dl
///
/// Cache read/write failures and chunk decompression failures are deliberately
/// absent: they are recovered locally (network fallback, uncompressed fallback)
/// and never escalate to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "server_path")
        key: Option<String>,
    },

    /// Manifest could not be parsed or fails a referential-integrity check
    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    /// A required argument was empty or absent
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// Requested file name is not present in the manifest
    #[error("file not found in manifest: {0}")]
    FileNotFound(String),

    /// Fetching or decoding one chunk failed, aborting the enclosing download
    #[error("chunk {guid} fetch failed: {message}")]
    ChunkFetch {
        /// GUID of the chunk whose fetch failed
        guid: String,
        /// What went wrong (HTTP status, transport error, truncated chunk, ...)
        message: String,
    },

    /// I/O error (manifest file read, output sink write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] with an associated configuration key.
    pub(crate) fn config(message: impl Into<String>, key: &str) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Shorthand for a [`Error::ChunkFetch`] naming the failing chunk.
    pub(crate) fn chunk_fetch(guid: &str, message: impl Into<String>) -> Self {
        Error::ChunkFetch {
            guid: guid.to_string(),
            message: message.into(),
        }
    }
}
