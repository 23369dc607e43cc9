//! Persistent fingerprint tracking
//!
//! Records a cheap fingerprint (path + modification time) for every file a
//! scan visits, so later scans can tell which files changed without reading
//! their contents.

pub mod classifier;
pub mod database;
pub mod session;
pub mod signature;

pub use classifier::{ChangeClassifier, Classification};
pub use database::{FingerprintStore, Lookup};
pub use session::{ScanReport, ScanResult, ScanStats};
pub use signature::{fingerprint, FileStatus};
