//! Core error types shared across the toolchain.
//!
//! Pipeline-stage problems are diagnostics, not errors; these types
//! cover the driver-facing failures that happen outside the pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to get source text into memory.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source file could not be opened or read.
    #[error("can not touch the file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for source loading.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
