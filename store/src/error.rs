//! Typed storage errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The underlying medium is unavailable or schema creation failed.
///
/// Fatal to the session's persistence capability: callers surface a degraded
/// or loading state and may retry initialization.
#[derive(Debug, Error)]
pub enum StorageInitError {
    #[error("failed to prepare storage directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open trace database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to open in-memory trace database: {0}")]
    OpenInMemory(#[source] rusqlite::Error),
    #[error("failed to configure trace database: {0}")]
    Pragma(#[source] rusqlite::Error),
    #[error("failed to create trace schema: {0}")]
    Schema(#[source] rusqlite::Error),
}

/// Failure of a store operation after (or during lazy) initialization.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Init(#[from] StorageInitError),
    #[error("trace query failed: {0}")]
    Backend(#[from] rusqlite::Error),
    #[error("failed to persist trace document: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode trace document: {0}")]
    Encode(#[from] serde_json::Error),
}
