//! The trace record: one released piece of text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ReleasedText;

/// Opaque unique identifier for a trace, generated at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Origin channel of a released trace.
///
/// Currently the only channel is the main input; the tag is stored with each
/// record so future channels remain distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSource {
    MainInput,
}

impl TraceSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MainInput => "main_input",
        }
    }

    /// Parse the stored tag; unknown tags return `None`.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "main_input" => Some(Self::MainInput),
            _ => None,
        }
    }
}

/// A released piece of text, immutable once created.
///
/// `preview` is derived at creation and stored verbatim; it is never
/// recomputed on read, so historical previews stay stable even if the
/// derivation changes later. `created_at` is an RFC 3339 UTC timestamp whose
/// lexicographic order equals chronological order.
///
/// Serde field names match the payloads the original deployments persisted
/// (`createdAt`, `source: "main_input"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub id: TraceId,
    pub text: ReleasedText,
    pub preview: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub source: TraceSource,
}
