//! Trace persistence for unhappened.
//!
//! One contract, two backends:
//! - [`SqliteTraceStore`] - durable on-device storage: one `traces` table
//!   with a descending `created_at` index, lazily opened once per store and
//!   cached for reuse;
//! - [`LocalTraceStore`] - a single JSON document under a fixed file name,
//!   degrading to an in-memory list when the medium is unavailable.
//!
//! Both backends produce identical externally observable semantics for
//! create/list/delete. The composition root selects one at startup and hands
//! the session an `Arc<dyn TraceStore>`; nothing above this crate knows which
//! backend is in play.

mod error;
mod intro;
mod local;
mod record;
mod sqlite;

pub use error::{StorageError, StorageInitError};
pub use intro::IntroFlag;
pub use local::LocalTraceStore;
pub use sqlite::SqliteTraceStore;

use std::path::PathBuf;

use async_trait::async_trait;

use unhappened_types::{Trace, TraceId};

/// Persistence contract over the single trace entity.
///
/// All operations are read-your-writes within a single process: `list`
/// reflects every prior successful `create` and `delete` at the time of the
/// call.
#[async_trait]
pub trait TraceStore: Send + Sync {
    /// Prepare the underlying storage, creating schema or structures if
    /// absent. Idempotent; safe to call multiple times; must be awaited
    /// before any other operation.
    async fn initialize(&self) -> Result<(), StorageInitError>;

    /// Trim and persist `text` as a new trace.
    ///
    /// Empty or whitespace-only input returns `Ok(None)` without inserting -
    /// a deliberate no-op signal, never a failure.
    async fn create(&self, text: &str) -> Result<Option<Trace>, StorageError>;

    /// All stored traces, most recent first by `created_at`.
    async fn list(&self) -> Result<Vec<Trace>, StorageError>;

    /// Remove the trace with the matching id. An absent id is a silent
    /// no-op.
    async fn delete(&self, id: &TraceId) -> Result<(), StorageError>;
}

/// Per-user data directory for the app's stores.
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("unhappened"))
}
