//! Error types for scanning and the fingerprint store

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a scan before any file is classified
#[derive(Debug, Error)]
pub enum ScanError {
    /// Scan root does not exist
    #[error("scan root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Scan root exists but is not a directory
    #[error("scan root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Root could not be resolved (permissions, broken link, ...)
    #[error("failed to access scan root {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persistence-layer failures. These never leave the store's public API;
/// they are logged and turned into a degraded return value.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database file could not be opened
    #[error("failed to open fingerprint store {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query, lock timeout, or malformed schema
    #[error("fingerprint store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Store directory could not be created
    #[error("fingerprint store I/O error: {0}")]
    Io(#[from] std::io::Error),
}
