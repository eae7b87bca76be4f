//! One-shot flag recording that the intro screen was shown.

use std::io;
use std::path::PathBuf;

/// Versioned marker name, like the original storage key.
const INTRO_SEEN_FILE: &str = "intro_seen_v1";

/// Marker file in the app's data directory.
///
/// An unavailable medium reads as "not seen" - showing the intro again is
/// the harmless direction to fail in.
#[derive(Debug, Clone)]
pub struct IntroFlag {
    path: PathBuf,
}

impl IntroFlag {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(INTRO_SEEN_FILE),
        }
    }

    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.path.exists()
    }

    pub fn mark_seen(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, b"1")
    }
}
