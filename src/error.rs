//! # Error Types
//!
//! This module defines error types used throughout the dado library.
//!
//! Every error is terminal for the run that produced it: the pipeline never
//! retries and never leaves a partial file at the output path.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dado operations
#[derive(Debug, Error)]
pub enum DadoError {
    /// Source image does not exist at the given path
    #[error("image not found: {path}")]
    ImageNotFound { path: PathBuf },

    /// Source image exists but could not be decoded
    #[error("failed to decode {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// One of the six dice face bitmaps could not be loaded
    #[error("dice face missing: {path}: {reason}")]
    ResourceMissing { path: PathBuf, reason: String },

    /// Scale factor rejected before preprocessing begins
    #[error("invalid scale {scale}: must be at least 1")]
    InvalidScale { scale: u32 },

    /// Output write failed; the in-memory canvas is discarded
    #[error("failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Run was cancelled at a row boundary; nothing was persisted
    #[error("conversion cancelled")]
    Cancelled,

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
