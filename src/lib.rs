//! changescan library crate
//!
//! Detects which files under a directory changed since the last scan by
//! comparing a cheap path + modification time fingerprint against a
//! persisted SQLite store. The binary wraps this with a CLI.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod scan_cache;
pub mod scanner;
pub mod walker;

pub use error::{ScanError, StoreError};
pub use scan_cache::{FileStatus, FingerprintStore, ScanReport, ScanResult};
pub use scanner::{scan, scan_with_progress};
pub use walker::{walk, ExtensionFilter};
