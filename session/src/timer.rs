//! Frame-advanced duration timers.

use std::time::Duration;

fn normalized_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }

    let elapsed = elapsed.as_secs_f32();
    let total = duration.as_secs_f32();
    (elapsed / total).clamp(0.0, 1.0)
}

/// Progress timer advanced by the caller once per frame.
///
/// Completion is observed, never called back: whoever advances the timer
/// decides what a finished timer means, and dropping the timer is
/// cancellation. Nothing can fire after teardown.
#[derive(Debug, Clone)]
pub(crate) struct ProgressTimer {
    elapsed: Duration,
    duration: Duration,
}

impl ProgressTimer {
    #[must_use]
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub(crate) fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }

    #[must_use]
    pub(crate) fn progress(&self) -> f32 {
        normalized_progress(self.elapsed, self.duration)
    }

    #[must_use]
    pub(crate) fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
