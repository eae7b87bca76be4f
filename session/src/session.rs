//! The interaction session owning the ritual's transient state.
//!
//! Gestures arrive as method calls, the UI ticks the session once per frame,
//! and the session fires timer completions exactly once. The re-entry guard
//! is the single concurrency-sensitive invariant: it is set synchronously
//! before the release sequence's first await and cleared only after the
//! released display window ends or the sequence fails.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use unhappened_store::TraceStore;
use unhappened_types::{
    RitualPhase, Trace, TraceId, next_phase_on_arm, next_phase_on_hold_cancel,
    next_phase_on_hold_start, release_hint,
};

use crate::config::MotionConfig;
use crate::timer::ProgressTimer;

/// A single user's in-flight ritual: draft text, phase, timers, and the
/// cached trace listing.
pub struct RitualSession {
    store: Arc<dyn TraceStore>,
    config: MotionConfig,
    phase: RitualPhase,
    draft: String,
    traces: Vec<Trace>,
    hold: Option<ProgressTimer>,
    released_window: Option<ProgressTimer>,
    releasing: bool,
    storage_ready: bool,
}

impl RitualSession {
    #[must_use]
    pub fn new(store: Arc<dyn TraceStore>, config: MotionConfig) -> Self {
        Self {
            store,
            config,
            phase: RitualPhase::Idle,
            draft: String::new(),
            traces: Vec::new(),
            hold: None,
            released_window: None,
            releasing: false,
            storage_ready: false,
        }
    }

    /// Prepare storage and load the existing traces.
    ///
    /// Until this succeeds the session reports not-ready and the caller
    /// shows its loading state; initialization may be retried.
    pub async fn initialize(&mut self) -> Result<()> {
        self.store
            .initialize()
            .await
            .context("Failed to initialize trace storage")?;
        self.refresh_traces().await?;
        self.storage_ready = true;
        Ok(())
    }

    /// Replace the draft text, applying the auto-reset rule: an empty draft
    /// forces the phase back to idle (and cancels any hold) unless the
    /// released display window is on screen. Release affordances never
    /// appear for empty input.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        if !self.has_draft() && self.phase != RitualPhase::Released {
            self.phase = RitualPhase::Idle;
            self.hold = None;
        }
    }

    /// Arm the release affordance.
    pub fn arm(&mut self) {
        self.phase = next_phase_on_arm(self.phase, self.has_draft());
    }

    /// Begin the hold gesture; starts the hold timer on the armed -> holding
    /// transition and does nothing otherwise.
    pub fn begin_hold(&mut self) {
        let next = next_phase_on_hold_start(self.phase);
        if next == self.phase {
            return;
        }
        self.phase = next;
        self.hold = Some(ProgressTimer::new(self.config.hold));
    }

    /// End the hold gesture early. Ignored once a release is committing.
    pub fn end_hold(&mut self) {
        let next = next_phase_on_hold_cancel(self.phase, self.releasing);
        if next == self.phase {
            return;
        }
        self.hold = None;
        self.phase = next;
    }

    /// Advance the session's timers by one frame.
    ///
    /// A finished hold timer commits the release; a finished released-window
    /// timer resets the phase to idle and clears the re-entry guard.
    pub async fn tick(&mut self, delta: Duration) -> Result<()> {
        if let Some(timer) = &mut self.hold {
            timer.advance(delta);
            if timer.is_finished() {
                self.hold = None;
                self.finish_release().await?;
            }
        }

        if let Some(timer) = &mut self.released_window {
            timer.advance(delta);
            if timer.is_finished() {
                self.released_window = None;
                self.phase = RitualPhase::Idle;
                self.releasing = false;
            }
        }

        Ok(())
    }

    /// Commit the release: persist the draft, refresh the listing, clear the
    /// input, and enter the released display window.
    ///
    /// At most one trace is created per completed hold: duplicate completion
    /// signals while a release is committing are ignored. On persistence
    /// failure the guard is released and the phase and draft are left
    /// untouched so a retry is possible.
    pub async fn finish_release(&mut self) -> Result<()> {
        if self.releasing {
            return Ok(());
        }
        self.releasing = true;

        let result = self.commit_release().await;
        if result.is_err() {
            self.releasing = false;
        }
        result
    }

    async fn commit_release(&mut self) -> Result<()> {
        self.store
            .create(&self.draft)
            .await
            .context("Failed to persist released trace")?;
        self.refresh_traces().await?;
        self.draft.clear();
        self.hold = None;
        self.phase = RitualPhase::Released;
        self.released_window = Some(ProgressTimer::new(self.config.released_state));
        Ok(())
    }

    /// Reload the cached listing from the store.
    pub async fn refresh_traces(&mut self) -> Result<()> {
        self.traces = self.store.list().await.context("Failed to list traces")?;
        Ok(())
    }

    /// Consume a historical trace back into the active input: delete it from
    /// the store, republish its text as the draft, and force the phase back
    /// to idle. Unknown ids are a no-op.
    pub async fn return_to_now(&mut self, id: &TraceId) -> Result<()> {
        let Some(trace) = self.traces.iter().find(|trace| trace.id == *id).cloned() else {
            return Ok(());
        };

        self.store
            .delete(id)
            .await
            .context("Failed to delete consumed trace")?;
        self.refresh_traces().await?;

        self.draft = trace.text.into_inner();
        self.phase = RitualPhase::Idle;
        self.hold = None;
        self.released_window = None;
        self.releasing = false;
        Ok(())
    }

    #[must_use]
    pub fn phase(&self) -> RitualPhase {
        self.phase
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[must_use]
    pub fn has_draft(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    #[must_use]
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Hint copy for the current phase.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        release_hint(self.phase)
    }

    /// Normalized progress of an in-flight hold, if one is running.
    #[must_use]
    pub fn hold_progress(&self) -> Option<f32> {
        self.hold.as_ref().map(ProgressTimer::progress)
    }

    #[must_use]
    pub fn is_storage_ready(&self) -> bool {
        self.storage_ready
    }

    #[must_use]
    pub fn config(&self) -> MotionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use unhappened_store::{
        LocalTraceStore, SqliteTraceStore, StorageError, StorageInitError, TraceStore,
    };
    use unhappened_types::{RitualPhase, Trace, TraceId};

    use super::{MotionConfig, RitualSession};

    fn session() -> RitualSession {
        RitualSession::new(Arc::new(LocalTraceStore::in_memory()), MotionConfig::default())
    }

    async fn ready_session() -> RitualSession {
        let mut session = session();
        session.initialize().await.expect("initialize");
        session
    }

    #[tokio::test]
    async fn initialize_marks_storage_ready_and_loads_traces() {
        let store = Arc::new(LocalTraceStore::in_memory());
        store.initialize().await.expect("store initialize");
        store
            .create("left from a previous session")
            .await
            .expect("create");

        let mut session = RitualSession::new(store, MotionConfig::default());
        assert!(!session.is_storage_ready());

        session.initialize().await.expect("initialize");
        assert!(session.is_storage_ready());
        assert_eq!(session.traces().len(), 1);
    }

    #[tokio::test]
    async fn full_ritual_creates_exactly_one_trace() {
        let mut session = ready_session().await;
        let config = session.config();

        session.set_draft("let this go");
        session.arm();
        assert_eq!(session.phase(), RitualPhase::Armed);

        session.begin_hold();
        assert_eq!(session.phase(), RitualPhase::Holding);
        assert!(session.hold_progress().expect("hold running") < f32::EPSILON);

        session.tick(config.hold / 2).await.expect("tick");
        assert_eq!(session.phase(), RitualPhase::Holding);

        session.tick(config.hold).await.expect("tick");
        assert_eq!(session.phase(), RitualPhase::Released);
        assert_eq!(session.draft(), "");
        assert_eq!(session.traces().len(), 1);
        assert_eq!(session.traces()[0].text.as_str(), "let this go");

        session.tick(config.released_state).await.expect("tick");
        assert_eq!(session.phase(), RitualPhase::Idle);

        // A new ritual can begin immediately.
        session.set_draft("again");
        session.arm();
        assert_eq!(session.phase(), RitualPhase::Armed);
    }

    #[tokio::test]
    async fn duplicate_completion_creates_one_trace() {
        let mut session = ready_session().await;

        session.set_draft("only once");
        session.arm();
        session.begin_hold();

        session.finish_release().await.expect("first completion");
        session.finish_release().await.expect("duplicate completion");

        assert_eq!(session.traces().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_hold_returns_to_armed_and_persists_nothing() {
        let mut session = ready_session().await;
        let config = session.config();

        session.set_draft("not yet");
        session.arm();
        session.begin_hold();
        session.tick(config.hold / 2).await.expect("tick");

        session.end_hold();
        assert_eq!(session.phase(), RitualPhase::Armed);
        assert!(session.hold_progress().is_none());

        session.tick(config.hold * 2).await.expect("tick");
        assert_eq!(session.phase(), RitualPhase::Armed);
        assert!(session.traces().is_empty());
        assert_eq!(session.draft(), "not yet");
    }

    #[tokio::test]
    async fn clearing_draft_resets_phase_and_cancels_hold() {
        let mut session = ready_session().await;

        session.set_draft("about to vanish");
        session.arm();
        session.begin_hold();

        session.set_draft("   ");
        assert_eq!(session.phase(), RitualPhase::Idle);
        assert!(session.hold_progress().is_none());
    }

    #[tokio::test]
    async fn clearing_draft_does_not_disturb_released_window() {
        let mut session = ready_session().await;
        let config = session.config();

        session.set_draft("released words");
        session.arm();
        session.begin_hold();
        session.tick(config.hold).await.expect("tick");
        assert_eq!(session.phase(), RitualPhase::Released);

        session.set_draft("");
        assert_eq!(session.phase(), RitualPhase::Released);
    }

    #[tokio::test]
    async fn begin_hold_is_inert_unless_armed() {
        let mut session = ready_session().await;

        session.begin_hold();
        assert_eq!(session.phase(), RitualPhase::Idle);
        assert!(session.hold_progress().is_none());

        session.set_draft("words");
        session.begin_hold();
        assert_eq!(session.phase(), RitualPhase::Idle);
    }

    #[tokio::test]
    async fn return_to_now_consumes_the_trace() {
        let mut session = ready_session().await;
        let config = session.config();

        session.set_draft("the one that comes back");
        session.arm();
        session.begin_hold();
        session.tick(config.hold).await.expect("tick");

        let id = session.traces()[0].id.clone();
        session.return_to_now(&id).await.expect("return to now");

        assert_eq!(session.draft(), "the one that comes back");
        assert_eq!(session.phase(), RitualPhase::Idle);
        assert!(session.traces().is_empty());
    }

    #[tokio::test]
    async fn return_to_now_with_unknown_id_is_a_no_op() {
        let mut session = ready_session().await;
        session.set_draft("kept");

        session
            .return_to_now(&TraceId::new("no-such-id"))
            .await
            .expect("unknown id");
        assert_eq!(session.draft(), "kept");
    }

    #[tokio::test]
    async fn works_against_the_durable_backend_too() {
        let mut session = RitualSession::new(
            Arc::new(SqliteTraceStore::in_memory()),
            MotionConfig::default(),
        );
        session.initialize().await.expect("initialize");
        let config = session.config();

        session.set_draft("backend agnostic");
        session.arm();
        session.begin_hold();
        session.tick(config.hold).await.expect("tick");

        assert_eq!(session.traces().len(), 1);
    }

    /// Store double whose next create fails, for the retry path.
    struct FlakyStore {
        inner: LocalTraceStore,
        fail_next: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: LocalTraceStore::in_memory(),
                fail_next: AtomicBool::new(true),
            }
        }
    }

    #[async_trait]
    impl TraceStore for FlakyStore {
        async fn initialize(&self) -> Result<(), StorageInitError> {
            self.inner.initialize().await
        }

        async fn create(&self, text: &str) -> Result<Option<Trace>, StorageError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(StorageError::Io(std::io::Error::other("medium failed")));
            }
            self.inner.create(text).await
        }

        async fn list(&self) -> Result<Vec<Trace>, StorageError> {
            self.inner.list().await
        }

        async fn delete(&self, id: &TraceId) -> Result<(), StorageError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn failed_release_keeps_draft_and_allows_retry() {
        let mut session =
            RitualSession::new(Arc::new(FlakyStore::new()), MotionConfig::default());
        session.initialize().await.expect("initialize");
        let config = session.config();

        session.set_draft("worth keeping");
        session.arm();
        session.begin_hold();

        let err = session.tick(config.hold).await;
        assert!(err.is_err());
        assert_eq!(session.draft(), "worth keeping");
        assert_eq!(session.phase(), RitualPhase::Holding);
        assert!(session.traces().is_empty());

        // The guard was released, so completing again succeeds.
        session.finish_release().await.expect("retry");
        assert_eq!(session.phase(), RitualPhase::Released);
        assert_eq!(session.traces().len(), 1);
    }
}
