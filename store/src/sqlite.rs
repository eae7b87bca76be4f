//! Durable trace storage backed by SQLite.
//!
//! The connection is opened lazily on first use and cached for the life of
//! the store. Lazy opening goes through an async once-cell, so concurrent
//! first uses converge on a single initialization attempt and share its
//! result - the database file is never opened twice. Statements run
//! synchronously under a mutex inside the async loop; for a single-user
//! journal the write rate makes that a non-issue.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, params};
use tokio::sync::{Mutex, OnceCell};

use unhappened_types::{ReleasedText, Trace, TraceId, TraceSource};

use crate::TraceStore;
use crate::error::{StorageError, StorageInitError};
use crate::record::new_trace;

const DB_FILE: &str = "unhappened.db";

#[derive(Debug)]
enum Location {
    File(PathBuf),
    Memory,
}

/// SQLite-backed trace store.
pub struct SqliteTraceStore {
    location: Location,
    conn: OnceCell<Mutex<Connection>>,
}

impl SqliteTraceStore {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS traces (
            id TEXT PRIMARY KEY NOT NULL,
            text TEXT NOT NULL,
            preview TEXT NOT NULL,
            created_at TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT 'main_input'
        );

        CREATE INDEX IF NOT EXISTS idx_traces_created_at
        ON traces(created_at DESC);
    ";

    /// Store whose database lives at `dir/unhappened.db`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(dir.into().join(DB_FILE)),
            conn: OnceCell::new(),
        }
    }

    /// Open an in-memory store (for testing).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: OnceCell::new(),
        }
    }

    async fn conn(&self) -> Result<&Mutex<Connection>, StorageInitError> {
        self.conn
            .get_or_try_init(|| async {
                let conn = match &self.location {
                    Location::File(path) => {
                        prepare_db_path(path)?;
                        Connection::open(path).map_err(|source| StorageInitError::Open {
                            path: path.clone(),
                            source,
                        })?
                    }
                    Location::Memory => {
                        Connection::open_in_memory().map_err(StorageInitError::OpenInMemory)?
                    }
                };
                conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")
                    .map_err(StorageInitError::Pragma)?;
                conn.execute_batch(Self::SCHEMA)
                    .map_err(StorageInitError::Schema)?;
                Ok(Mutex::new(conn))
            })
            .await
    }
}

#[async_trait]
impl TraceStore for SqliteTraceStore {
    async fn initialize(&self) -> Result<(), StorageInitError> {
        self.conn().await.map(|_| ())
    }

    async fn create(&self, text: &str) -> Result<Option<Trace>, StorageError> {
        let Some(trace) = new_trace(text) else {
            return Ok(None);
        };

        let conn = self.conn().await?.lock().await;
        conn.execute(
            "INSERT INTO traces (id, text, preview, created_at, source)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                trace.id.as_str(),
                trace.text.as_str(),
                &trace.preview,
                &trace.created_at,
                trace.source.as_str()
            ],
        )?;

        Ok(Some(trace))
    }

    async fn list(&self) -> Result<Vec<Trace>, StorageError> {
        let conn = self.conn().await?.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, text, preview, created_at, source
             FROM traces
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let text: String = row.get(1)?;
            let preview: String = row.get(2)?;
            let created_at: String = row.get(3)?;
            let source: String = row.get(4)?;
            Ok((id, text, preview, created_at, source))
        })?;

        let mut traces = Vec::new();
        for row in rows {
            let (id, text, preview, created_at, source) = row?;
            // Stored rows satisfy the domain invariants; skip any that no
            // longer do rather than failing the whole listing.
            let Ok(text) = ReleasedText::new(&text) else {
                continue;
            };
            let Some(source) = TraceSource::parse(&source) else {
                continue;
            };
            traces.push(Trace {
                id: TraceId::new(id),
                text,
                preview,
                created_at,
                source,
            });
        }

        Ok(traces)
    }

    async fn delete(&self, id: &TraceId) -> Result<(), StorageError> {
        let conn = self.conn().await?.lock().await;
        conn.execute("DELETE FROM traces WHERE id = ?1", [id.as_str()])?;
        Ok(())
    }
}

/// Create the database's parent directory and keep the journal private to
/// its owner.
fn prepare_db_path(path: &Path) -> Result<(), StorageInitError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    std::fs::create_dir_all(parent).map_err(|source| StorageInitError::Prepare {
        path: parent.to_path_buf(),
        source,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700)).map_err(
            |source| StorageInitError::Prepare {
                path: parent.to_path_buf(),
                source,
            },
        )?;
    }

    Ok(())
}
