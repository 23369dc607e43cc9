//! SQLite-backed fingerprint store
//!
//! Maps file paths to their last-known fingerprint. A connection is opened
//! for every logical operation and closed (committed or rolled back) before
//! the call returns, so a failure such as a lock timeout only affects the
//! operation that hit it. Persistence errors never escape the public API:
//! they are logged and reported as "did not take effect".

use crate::error::StoreError;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SCHEMA_VERSION: i32 = 1;

/// Default time to wait on a locked database before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of a point lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A record exists for the path
    Found(String),
    /// The store is healthy but has no record for the path
    NotFound,
    /// The lookup failed (store unavailable, locked, or malformed)
    Unavailable,
}

impl Lookup {
    /// Fingerprint if one was found
    pub fn fingerprint(&self) -> Option<&str> {
        match self {
            Lookup::Found(fp) => Some(fp.as_str()),
            _ => None,
        }
    }
}

/// Durable path -> fingerprint mapping
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl FingerprintStore {
    /// Create a store backed by the database file at `db_path`
    ///
    /// Nothing is opened here; the file and schema are created lazily on the
    /// first operation.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Override how long an operation waits on a locked database
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Location of the backing database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Create the table and lookup index if absent
    ///
    /// Idempotent; every other operation runs it too. Returns whether the
    /// schema is in place.
    pub fn ensure_schema(&self) -> bool {
        self.report("ensure schema", None, self.connect().map(|_| ()))
            .is_some()
    }

    /// Whether a record exists for `path`
    pub fn exists(&self, path: &Path) -> bool {
        let key = normalize_path(path);
        let result = self.with_connection(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM files WHERE path = ?1", [&key], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        });
        self.report("exists", Some(path), result).unwrap_or(false)
    }

    /// Look up the stored fingerprint for `path`
    pub fn get(&self, path: &Path) -> Lookup {
        let key = normalize_path(path);
        let result = self.with_connection(|conn| {
            let fp = conn
                .query_row(
                    "SELECT fingerprint FROM files WHERE path = ?1",
                    [&key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(fp)
        });

        match self.report("get", Some(path), result) {
            Some(Some(fp)) => Lookup::Found(fp),
            Some(None) => Lookup::NotFound,
            None => Lookup::Unavailable,
        }
    }

    /// Record `fingerprint` for `path`, overwriting any existing record
    ///
    /// Upsert semantics: inserting an existing path replaces its fingerprint
    /// rather than failing. Returns whether the write took effect.
    pub fn insert(&self, path: &Path, fingerprint: &str) -> bool {
        let key = normalize_path(path);
        let result = self.with_connection(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO files (path, fingerprint) VALUES (?1, ?2)
                 ON CONFLICT(path) DO UPDATE SET fingerprint = excluded.fingerprint",
                params![key, fingerprint],
            )?;
            tx.commit()?;
            Ok(())
        });
        self.report("insert", Some(path), result).is_some()
    }

    /// Overwrite the fingerprint of an existing record
    ///
    /// No-op if `path` has no record. Returns whether a record was updated.
    pub fn update(&self, path: &Path, fingerprint: &str) -> bool {
        let key = normalize_path(path);
        let result = self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let rows = tx.execute(
                "UPDATE files SET fingerprint = ?2 WHERE path = ?1",
                params![key, fingerprint],
            )?;
            tx.commit()?;
            Ok(rows > 0)
        });
        self.report("update", Some(path), result).unwrap_or(false)
    }

    /// Drop the record for `path`. Returns whether a record was removed.
    pub fn forget(&self, path: &Path) -> bool {
        let key = normalize_path(path);
        let result = self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let rows = tx.execute("DELETE FROM files WHERE path = ?1", [&key])?;
            tx.commit()?;
            Ok(rows > 0)
        });
        self.report("forget", Some(path), result).unwrap_or(false)
    }

    /// Number of tracked paths, or `None` if the store is unavailable
    pub fn len(&self) -> Option<usize> {
        let result = self.with_connection(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
            Ok(count as usize)
        });
        self.report("count", None, result)
    }

    /// Whether the store holds no records (an unavailable store counts as empty)
    pub fn is_empty(&self) -> bool {
        self.len().unwrap_or(0) == 0
    }

    /// Open a connection with the schema in place
    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut conn = Connection::open(&self.db_path).map_err(|source| StoreError::Open {
            path: self.db_path.clone(),
            source,
        })?;
        conn.busy_timeout(self.busy_timeout)?;

        init_schema(&mut conn)?;
        Ok(conn)
    }

    /// Run one logical operation on a fresh connection
    ///
    /// The connection is dropped before returning; an uncommitted transaction
    /// is rolled back on drop.
    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.connect()?;
        op(&mut conn)
    }

    /// Log a failed operation and collapse the error into `None`
    fn report<T>(&self, op: &str, path: Option<&Path>, result: Result<T, StoreError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                match path {
                    Some(path) => tracing::warn!(
                        store = %self.db_path.display(),
                        path = %path.display(),
                        error = %e,
                        "fingerprint store {op} failed"
                    ),
                    None => tracing::warn!(
                        store = %self.db_path.display(),
                        error = %e,
                        "fingerprint store {op} failed"
                    ),
                }
                None
            }
        }
    }
}

/// Bring the schema up to date if needed
fn init_schema(conn: &mut Connection) -> Result<(), StoreError> {
    let version: i32 = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .ok()
        .flatten()
        .unwrap_or(0);

    if version < SCHEMA_VERSION {
        migrate_schema(conn, version)?;
    }

    Ok(())
}

/// Create tables and indexes inside an immediate transaction
///
/// Every statement is `IF NOT EXISTS`, so two processes racing through a
/// migration end up with the same schema.
fn migrate_schema(conn: &mut Connection, from_version: i32) -> Result<(), StoreError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    if from_version < 1 {
        tx.execute(
            "CREATE TABLE IF NOT EXISTS files (
                path TEXT PRIMARY KEY,
                fingerprint TEXT NOT NULL
            )",
            [],
        )?;
        tx.execute(
            "CREATE INDEX IF NOT EXISTS idx_files_path_fingerprint ON files(path, fingerprint)",
            [],
        )?;
    }

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )?;

    tx.commit()?;
    tracing::debug!(from = from_version, to = SCHEMA_VERSION, "fingerprint store schema initialized");
    Ok(())
}

/// Normalize path for consistent storage and lookup
/// On Windows, converts to lowercase for case-insensitive matching
/// On Unix, preserves the path as-is
fn normalize_path(path: &Path) -> String {
    #[cfg(windows)]
    {
        path.to_string_lossy().to_lowercase().replace('\\', "/")
    }
    #[cfg(not(windows))]
    {
        path.to_string_lossy().into_owned()
    }
}
