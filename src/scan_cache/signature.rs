//! Fingerprint computation and file status

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Substituted for the modification time when it cannot be read
pub const MTIME_SENTINEL: SystemTime = UNIX_EPOCH;

/// Length of the hex fingerprint kept in the store
const FINGERPRINT_LEN: usize = 32;

/// Compute the fingerprint for a path seen at a given modification time
///
/// The fingerprint is a proxy identity token, not a content hash: no file
/// bytes are read. It is a truncated blake3 digest of
/// `"<path>|<secs>.<nanos>"`, so it is stable across restarts and platforms
/// for the same inputs.
pub fn fingerprint(path: &Path, modified: SystemTime) -> String {
    let (secs, nsecs) = system_time_to_secs_nsecs(modified);
    let input = format!("{}|{}.{:09}", path.to_string_lossy(), secs, nsecs);

    let hash = blake3::hash(input.as_bytes());
    let mut hex = hash.to_hex().to_string();
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Read a file's modification time
///
/// Returns `None` (after logging) if the file vanished or its metadata is
/// unreadable; callers substitute [`MTIME_SENTINEL`].
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) => Some(mtime),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read modification time");
            None
        }
    }
}

/// Convert SystemTime to (seconds, nanoseconds) since the epoch
pub(crate) fn system_time_to_secs_nsecs(time: SystemTime) -> (i64, u32) {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => (duration.as_secs() as i64, duration.subsec_nanos()),
        Err(_) => (0, 0), // Pre-epoch mtimes fold into the sentinel
    }
}

/// Classification of a file against its last recorded fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Fingerprint differs from the stored one
    Changed,
    /// Fingerprint matches, or the file was seen for the first time
    Unchanged,
}

impl FileStatus {
    pub fn is_changed(self) -> bool {
        matches!(self, FileStatus::Changed)
    }
}
