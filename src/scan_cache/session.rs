//! Scan results and session summary

use crate::scan_cache::signature::FileStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// One classified file. Produced fresh every scan, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub path: PathBuf,
    pub status: FileStatus,
    pub observed_at: DateTime<Utc>,
    /// File modification time, if it could be read
    pub modified: Option<DateTime<Utc>>,
    /// The store could not be consulted; `status` is a safe default
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

/// Statistics for a scan session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total_files: usize,
    pub changed_files: usize,
    pub unchanged_files: usize,
    pub degraded_files: usize,
}

impl ScanStats {
    pub fn record(&mut self, result: &ScanResult) {
        self.total_files += 1;
        if result.status.is_changed() {
            self.changed_files += 1;
        } else {
            self.unchanged_files += 1;
        }
        if result.degraded {
            self.degraded_files += 1;
        }
    }
}

/// Full outcome of one scan, in walk order
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries: Vec<ScanResult>,
    pub stats: ScanStats,
}

impl ScanReport {
    /// Start an empty report for `root`
    pub fn new(root: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            root,
            started_at: now,
            finished_at: now,
            entries: Vec::new(),
            stats: ScanStats::default(),
        }
    }

    pub fn push(&mut self, result: ScanResult) {
        self.stats.record(&result);
        self.entries.push(result);
    }

    /// Mark report as finished
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Entries whose fingerprint changed
    pub fn changed(&self) -> impl Iterator<Item = &ScanResult> {
        self.entries.iter().filter(|e| e.status.is_changed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: FileStatus, degraded: bool) -> ScanResult {
        ScanResult {
            path: PathBuf::from("/data/a.txt"),
            status,
            observed_at: Utc::now(),
            modified: None,
            degraded,
        }
    }

    #[test]
    fn test_report_counts() {
        let mut report = ScanReport::new(PathBuf::from("/data"));
        report.push(entry(FileStatus::Changed, false));
        report.push(entry(FileStatus::Unchanged, false));
        report.push(entry(FileStatus::Unchanged, true));
        let report = report.finish();

        assert_eq!(
            report.stats,
            ScanStats {
                total_files: 3,
                changed_files: 1,
                unchanged_files: 2,
                degraded_files: 1,
            }
        );
        assert_eq!(report.changed().count(), 1);
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn test_degraded_flag_omitted_when_false() {
        let json = serde_json::to_value(entry(FileStatus::Unchanged, false)).unwrap();
        assert!(json.get("degraded").is_none());
        assert_eq!(json["status"], "unchanged");

        let json = serde_json::to_value(entry(FileStatus::Changed, true)).unwrap();
        assert_eq!(json["degraded"], true);
    }
}
