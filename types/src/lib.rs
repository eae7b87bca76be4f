//! Core domain types for unhappened.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies: the trace record, the ritual interaction state machine, and
//! the preview derivation. Everything here can be used from any layer of the
//! application.

mod preview;
mod ritual;
mod trace;

pub use preview::preview;
pub use ritual::{
    RitualPhase, next_phase_on_arm, next_phase_on_hold_cancel, next_phase_on_hold_start,
    release_hint,
};
pub use trace::{Trace, TraceId, TraceSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text the user deliberately released, guaranteed non-empty after trimming.
///
/// Construction trims the input and rejects anything that trims to empty, so
/// a blank trace is unrepresentable. The stored value is the trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleasedText(String);

#[derive(Debug, Error)]
#[error("released text must not be empty")]
pub struct EmptyTextError;

impl ReleasedText {
    pub fn new(value: impl AsRef<str>) -> Result<Self, EmptyTextError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            Err(EmptyTextError)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ReleasedText {
    type Error = EmptyTextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ReleasedText {
    type Error = EmptyTextError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReleasedText> for String {
    fn from(value: ReleasedText) -> Self {
        value.0
    }
}

impl std::ops::Deref for ReleasedText {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ReleasedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
