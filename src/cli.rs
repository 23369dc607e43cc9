use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::output::{self, OutputMode};
use crate::progress;
use crate::scan_cache::{fingerprint, FingerprintStore, Lookup};
use crate::scanner;

#[derive(Parser)]
#[command(name = "changescan")]
#[command(version)]
#[command(about = "Report which files changed since the last scan")]
#[command(long_about = "changescan records a cheap fingerprint (path + modification time) for \
    every file under a directory and reports which files changed since the previous scan. \
    Files seen for the first time are recorded as a baseline and reported unchanged.\n\n\
    Examples:\n  \
    changescan scan ~/projects             # Scan a tree\n  \
    changescan scan . --exclude .tmp       # Skip .tmp files\n  \
    changescan scan . --changed-only       # Only list changed files\n  \
    changescan scan . --json               # Machine-readable output")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity (-v, -vv for more)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every file under a directory as changed or unchanged
    #[command(visible_alias = "s")]
    Scan {
        /// Root directory to scan [default: current directory]
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Skip files with this extension, e.g. .tmp (repeatable)
        #[arg(short = 'e', long, value_name = "EXT")]
        exclude: Vec<String>,

        /// Fingerprint database to use instead of the configured one
        #[arg(long, value_name = "FILE")]
        db: Option<PathBuf>,

        /// Output results as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Only list files that changed
        #[arg(long)]
        changed_only: bool,
    },

    /// Show the stored and current fingerprint of a file
    Show {
        /// File to look up
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Fingerprint database to use instead of the configured one
        #[arg(long, value_name = "FILE")]
        db: Option<PathBuf>,
    },

    /// Drop a file's stored fingerprint so the next scan treats it as new
    Forget {
        /// File to forget
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Fingerprint database to use instead of the configured one
        #[arg(long, value_name = "FILE")]
        db: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.quiet {
            OutputMode::Quiet
        } else if self.verbose >= 2 {
            OutputMode::VeryVerbose
        } else if self.verbose == 1 {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let mode = self.output_mode();
        let config = Config::load();

        match self.command {
            Commands::Scan {
                path,
                exclude,
                db,
                json,
                changed_only,
            } => {
                let root = path.unwrap_or_else(|| PathBuf::from("."));
                let store = open_store(&config, db);
                let filter = config.extension_filter(&exclude);

                let spinner = if !json && mode != OutputMode::Quiet {
                    Some(progress::create_spinner("Starting scan..."))
                } else {
                    None
                };

                let mut seen = 0;
                let result = scanner::scan_with_progress(&store, &root, &filter, |p| {
                    seen += 1;
                    if let Some(ref sp) = spinner {
                        progress::set_current_path(sp, seen, p);
                    }
                });

                if let Some(sp) = spinner {
                    progress::finish_and_clear(&sp);
                }

                let report = result.with_context(|| format!("Scan of {} failed", root.display()))?;
                if json {
                    output::print_json(&report)?;
                } else {
                    output::print_human(&report, mode, changed_only);
                }
            }

            Commands::Show { file, db } => {
                let store = open_store(&config, db);
                let file = absolute(&file)?;

                let current = crate::scan_cache::signature::modified_time(&file)
                    .map(|mtime| fingerprint(&file, mtime));
                let stored = store.get(&file);

                println!("{}", file.display().to_string().bold());
                println!(
                    "  stored:  {}",
                    match &stored {
                        Lookup::Found(fp) => fp.clone(),
                        Lookup::NotFound => "not tracked".dimmed().to_string(),
                        Lookup::Unavailable => "store unavailable".red().to_string(),
                    }
                );
                println!(
                    "  current: {}",
                    current
                        .clone()
                        .unwrap_or_else(|| "unreadable".red().to_string())
                );
                if let (Some(stored), Some(current)) = (stored.fingerprint(), current.as_deref()) {
                    if stored != current {
                        println!("  {}", "changed since last scan".yellow());
                    }
                }
            }

            Commands::Forget { file, db } => {
                let store = open_store(&config, db);
                let file = absolute(&file)?;

                if store.forget(&file) {
                    if mode != OutputMode::Quiet {
                        println!("Forgot {}", file.display());
                    }
                } else {
                    eprintln!("{} {} is not tracked", "Warning:".yellow(), file.display());
                }
            }

            Commands::Config => {
                match config::config_file_path() {
                    Some(path) => println!("{}", format!("# {}", path.display()).dimmed()),
                    None => println!("{}", "# no config directory available".dimmed()),
                }
                print!("{}", config.to_toml()?);
            }
        }

        Ok(())
    }
}

fn open_store(config: &Config, db: Option<PathBuf>) -> FingerprintStore {
    let path = db.unwrap_or_else(|| config.store_path.clone());
    FingerprintStore::new(path).with_busy_timeout(config.busy_timeout())
}

/// Resolve a file argument the way scans record it: canonical and absolute
///
/// Falls back to joining with the current directory when the file no longer
/// exists, so stale records can still be forgotten.
fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return Ok(canonical);
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    Ok(cwd.join(path))
}
