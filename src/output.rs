use crate::scan_cache::{FileStatus, ScanReport, ScanResult};
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use colored::*;
use serde::Serialize;

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,       // Only errors
    Normal,      // Standard output
    Verbose,     // More details
    VeryVerbose, // All details including fingerprints
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    #[serde(flatten)]
    report: &'a ScanReport,
}

/// Print a scan report for humans, one line per file
pub fn print_human(report: &ScanReport, mode: OutputMode, changed_only: bool) {
    if mode == OutputMode::Quiet {
        return;
    }

    let entries: Vec<&ScanResult> = if changed_only {
        report.changed().collect()
    } else {
        report.entries.iter().collect()
    };
    for entry in entries {
        println!("{}", format_entry(entry));
    }

    let stats = &report.stats;
    println!();
    println!(
        "{} {} scanned, {} changed, {} unchanged",
        "Summary:".bold(),
        stats.total_files,
        stats.changed_files.to_string().yellow().bold(),
        stats.unchanged_files,
    );
    if stats.degraded_files > 0 {
        println!(
            "{} {} files could not be compared (fingerprint store unavailable)",
            "Warning:".yellow(),
            stats.degraded_files
        );
    }
    if mode != OutputMode::Normal {
        let elapsed = report.finished_at - report.started_at;
        println!(
            "{}",
            format!(
                "Root: {}  ({} ms)",
                report.root.display(),
                elapsed.num_milliseconds()
            )
            .dimmed()
        );
    }
}

/// Print a scan report as JSON for scripting
pub fn print_json(report: &ScanReport) -> Result<()> {
    let json = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        report,
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn format_entry(entry: &ScanResult) -> String {
    let status = match entry.status {
        FileStatus::Changed => "has changed...".yellow().bold(),
        FileStatus::Unchanged => "has NOT changed...".normal(),
    };
    let modified = entry
        .modified
        .map(format_time)
        .unwrap_or_else(|| "unknown".to_string());

    let mut line = format!("{} {} {}", entry.path.display(), status, modified.dimmed());
    if entry.degraded {
        line.push_str(&format!(" {}", "[store unavailable]".red()));
    }
    line
}

fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
