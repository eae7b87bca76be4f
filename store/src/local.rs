//! Fallback trace storage: one JSON document, whole-collection read/write.
//!
//! Mirrors the browser deployment's key-value persistence: the full trace
//! list is serialized under a single fixed name. When even that medium is
//! unavailable (unwritable profile, restricted storage), the store degrades
//! to an in-memory list - data then does not survive process restart, which
//! is an accepted degradation, not an error.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::warn;

use unhappened_types::{Trace, TraceId};

use crate::TraceStore;
use crate::error::{StorageError, StorageInitError};
use crate::record::new_trace;

/// Fixed document name, versioned like the original storage key.
const STORAGE_FILE: &str = "unhappened_traces_v1.json";

#[derive(Debug)]
enum Medium {
    File(PathBuf),
    Memory(Vec<Trace>),
}

/// Single-document trace store with in-memory degradation.
pub struct LocalTraceStore {
    medium: Mutex<Medium>,
}

impl LocalTraceStore {
    /// Store whose document lives at `dir/unhappened_traces_v1.json`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            medium: Mutex::new(Medium::File(dir.into().join(STORAGE_FILE))),
        }
    }

    /// Purely in-memory store, for tests or callers that already know the
    /// medium is unavailable.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            medium: Mutex::new(Medium::Memory(Vec::new())),
        }
    }
}

#[async_trait]
impl TraceStore for LocalTraceStore {
    async fn initialize(&self) -> Result<(), StorageInitError> {
        let mut medium = self.medium.lock().await;
        if let Medium::File(path) = &*medium {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(
                    path = %parent.display(),
                    "Trace medium unavailable, falling back to in-memory storage: {err}"
                );
                *medium = Medium::Memory(Vec::new());
            }
        }
        Ok(())
    }

    async fn create(&self, text: &str) -> Result<Option<Trace>, StorageError> {
        let Some(trace) = new_trace(text) else {
            return Ok(None);
        };

        let mut medium = self.medium.lock().await;
        match &mut *medium {
            Medium::File(path) => {
                let mut traces = read_document(path);
                traces.insert(0, trace.clone());
                write_document(path, &traces)?;
            }
            Medium::Memory(traces) => traces.insert(0, trace.clone()),
        }

        Ok(Some(trace))
    }

    async fn list(&self) -> Result<Vec<Trace>, StorageError> {
        let medium = self.medium.lock().await;
        let traces = match &*medium {
            Medium::File(path) => read_document(path),
            Medium::Memory(traces) => traces.clone(),
        };
        Ok(sorted_newest_first(traces))
    }

    async fn delete(&self, id: &TraceId) -> Result<(), StorageError> {
        let mut medium = self.medium.lock().await;
        match &mut *medium {
            Medium::File(path) => {
                let mut traces = read_document(path);
                traces.retain(|trace| trace.id != *id);
                write_document(path, &traces)?;
            }
            Medium::Memory(traces) => traces.retain(|trace| trace.id != *id),
        }
        Ok(())
    }
}

/// Read the whole collection. Never fails: a missing document is an empty
/// collection, and a corrupt or unreadable one is recovered as empty.
fn read_document(path: &Path) -> Vec<Trace> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            warn!(
                path = %path.display(),
                "Failed to read trace document, treating as empty: {err}"
            );
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(traces) => traces,
        Err(err) => {
            warn!(
                path = %path.display(),
                "Corrupt trace document, treating as empty: {err}"
            );
            Vec::new()
        }
    }
}

/// Replace the whole collection atomically (temp file + rename).
fn write_document(path: &Path, traces: &[Trace]) -> Result<(), StorageError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let bytes = serde_json::to_vec(traces)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(&bytes)?;
    tmp.persist(path).map_err(|err| StorageError::Io(err.error))?;

    Ok(())
}

/// Stable sort keeps same-timestamp entries in insertion order, which is
/// already newest-first.
fn sorted_newest_first(mut traces: Vec<Trace>) -> Vec<Trace> {
    traces.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    traces
}
