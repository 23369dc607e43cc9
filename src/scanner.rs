//! Full-tree scan: walk, classify each file, collect the report

use crate::error::ScanError;
use crate::scan_cache::{ChangeClassifier, FingerprintStore, ScanReport, ScanResult};
use crate::walker::{self, ExtensionFilter};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Scan every file under `root` and classify it against the store
///
/// Fails only if `root` is missing or not a directory. Per-file problems are
/// logged and recorded as degraded entries; the walk always runs to the end.
pub fn scan(
    store: &FingerprintStore,
    root: &Path,
    filter: &ExtensionFilter,
) -> Result<ScanReport, ScanError> {
    scan_with_progress(store, root, filter, |_| {})
}

/// Like [`scan`], calling `on_path` before each file is classified
pub fn scan_with_progress<F>(
    store: &FingerprintStore,
    root: &Path,
    filter: &ExtensionFilter,
    mut on_path: F,
) -> Result<ScanReport, ScanError>
where
    F: FnMut(&Path),
{
    let root = resolve_root(root)?;
    tracing::info!(
        root = %root.display(),
        store = %store.path().display(),
        excluded = ?filter.extensions(),
        "starting scan"
    );

    if !store.ensure_schema() {
        tracing::warn!(
            store = %store.path().display(),
            "fingerprint store unavailable, all files will be reported unchanged"
        );
    }

    let store_file = std::fs::canonicalize(store.path()).ok();
    let classifier = ChangeClassifier::new(store);
    let mut report = ScanReport::new(root.clone());

    for path in walker::walk(&root, filter) {
        if store_file.as_deref().is_some_and(|db| is_store_file(&path, db)) {
            continue;
        }
        on_path(&path);
        let classification = classifier.classify(&path);
        report.push(ScanResult {
            path,
            status: classification.status,
            observed_at: Utc::now(),
            modified: classification.modified,
            degraded: classification.degraded,
        });
    }

    let report = report.finish();
    tracing::info!(
        total = report.stats.total_files,
        changed = report.stats.changed_files,
        degraded = report.stats.degraded_files,
        "scan finished"
    );
    Ok(report)
}

/// SQLite side files that live next to the database
const STORE_SIDE_FILES: &[&str] = &["", "-journal", "-wal", "-shm"];

/// Whether `path` is the store database or one of its journal files
fn is_store_file(path: &Path, db: &Path) -> bool {
    let (Some(name), Some(db_name)) = (path.file_name(), db.file_name()) else {
        return false;
    };
    if path.parent() != db.parent() {
        return false;
    }
    let name = name.to_string_lossy();
    let db_name = db_name.to_string_lossy();
    STORE_SIDE_FILES
        .iter()
        .any(|suffix| name == format!("{db_name}{suffix}"))
}

/// Canonicalize the scan root so every yielded path is absolute
fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let metadata = match std::fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        Err(source) => {
            return Err(ScanError::Io {
                path: root.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    std::fs::canonicalize(root).map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })
}
