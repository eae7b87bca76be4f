//! Motion constants consumed by the session.

use std::time::Duration;

/// Gesture and display timings.
///
/// These mirror the product's motion tokens; the session consumes `hold` and
/// `released_state`, and a renderer reads `release_fade` for its
/// confirmation animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionConfig {
    /// How long the hold gesture must be sustained before the release
    /// commits.
    pub hold: Duration,
    /// Fade-in of the released confirmation.
    pub release_fade: Duration,
    /// How long the released state stays on screen before resetting to
    /// idle.
    pub released_state: Duration,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            hold: Duration::from_millis(750),
            release_fade: Duration::from_millis(450),
            released_state: Duration::from_millis(3000),
        }
    }
}
