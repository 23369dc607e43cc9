//! Per-file change classification

use crate::scan_cache::database::{FingerprintStore, Lookup};
use crate::scan_cache::signature::{self, FileStatus, MTIME_SENTINEL};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Outcome of classifying one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: FileStatus,
    /// Fingerprint computed for this observation
    pub fingerprint: String,
    /// Modification time, if it could be read
    pub modified: Option<DateTime<Utc>>,
    /// Set when the store could not be consulted or brought current
    pub degraded: bool,
}

/// Compares files against the fingerprint store and keeps it current
pub struct ChangeClassifier<'a> {
    store: &'a FingerprintStore,
}

impl<'a> ChangeClassifier<'a> {
    pub fn new(store: &'a FingerprintStore) -> Self {
        Self { store }
    }

    /// Classify `path` as changed or unchanged since the last observation
    ///
    /// A file seen for the first time is recorded as a baseline and reported
    /// unchanged. On return the store holds the fingerprint just computed,
    /// unless the store failed, in which case the result is flagged
    /// `degraded` and reported unchanged.
    pub fn classify(&self, path: &Path) -> Classification {
        let mtime = signature::modified_time(path);
        let fingerprint = signature::fingerprint(path, mtime.unwrap_or(MTIME_SENTINEL));
        let modified = mtime.map(DateTime::<Utc>::from);

        let (status, degraded) = match self.store.get(path) {
            Lookup::NotFound => {
                let recorded = self.store.insert(path, &fingerprint);
                tracing::debug!(path = %path.display(), "baseline recorded");
                (FileStatus::Unchanged, !recorded)
            }
            Lookup::Found(old) if old != fingerprint => {
                let recorded = self.store.update(path, &fingerprint);
                tracing::debug!(path = %path.display(), "fingerprint changed");
                (FileStatus::Changed, !recorded)
            }
            Lookup::Found(_) => (FileStatus::Unchanged, false),
            Lookup::Unavailable => {
                tracing::warn!(
                    path = %path.display(),
                    "fingerprint store unavailable, reporting file as unchanged"
                );
                (FileStatus::Unchanged, true)
            }
        };

        Classification {
            status,
            fingerprint,
            modified,
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FingerprintStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FingerprintStore::new(temp_dir.path().join("store").join("fingerprints.db"));
        (temp_dir, store)
    }

    #[test]
    fn test_first_sight_is_baseline() {
        let (temp_dir, store) = setup();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();

        let classifier = ChangeClassifier::new(&store);
        let first = classifier.classify(&file);
        assert_eq!(first.status, FileStatus::Unchanged);
        assert!(!first.degraded);
        assert_eq!(store.get(&file).fingerprint(), Some(first.fingerprint.as_str()));

        let second = classifier.classify(&file);
        assert_eq!(second.status, FileStatus::Unchanged);
        assert_eq!(second.fingerprint, first.fingerprint);
    }

    #[test]
    fn test_touch_reports_changed_once() {
        let (temp_dir, store) = setup();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();
        set_file_mtime(&file, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

        let classifier = ChangeClassifier::new(&store);
        assert_eq!(classifier.classify(&file).status, FileStatus::Unchanged);

        set_file_mtime(&file, FileTime::from_unix_time(1_600_000_100, 0)).unwrap();
        let changed = classifier.classify(&file);
        assert_eq!(changed.status, FileStatus::Changed);
        assert_eq!(store.get(&file).fingerprint(), Some(changed.fingerprint.as_str()));

        assert_eq!(classifier.classify(&file).status, FileStatus::Unchanged);
    }

    #[test]
    fn test_modified_time_is_reported() {
        let (temp_dir, store) = setup();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();
        set_file_mtime(&file, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

        let result = ChangeClassifier::new(&store).classify(&file);
        assert_eq!(result.modified.map(|m| m.timestamp()), Some(1_600_000_000));
    }

    #[test]
    fn test_missing_file_uses_sentinel() {
        let (temp_dir, store) = setup();
        let file = temp_dir.path().join("vanished.txt");

        let result = ChangeClassifier::new(&store).classify(&file);
        assert_eq!(result.status, FileStatus::Unchanged);
        assert!(result.modified.is_none());
        assert_eq!(result.fingerprint, signature::fingerprint(&file, MTIME_SENTINEL));
    }

    #[test]
    fn test_unavailable_store_is_degraded() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("store.db");
        fs::create_dir(&db_path).unwrap();
        let store = FingerprintStore::new(&db_path);

        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();

        let result = ChangeClassifier::new(&store).classify(&file);
        assert_eq!(result.status, FileStatus::Unchanged);
        assert!(result.degraded);
    }
}
