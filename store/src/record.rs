//! Trace record construction shared by every backend.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use unhappened_types::{ReleasedText, Trace, TraceId, TraceSource, preview};

/// Build a fresh trace from raw input.
///
/// Trims the input; empty or whitespace-only input yields `None`. The
/// preview is derived here, at write time, and travels with the record from
/// then on. Timestamps are RFC 3339 UTC with millisecond precision, the same
/// shape the original deployments stored, so lexicographic order equals
/// chronological order.
pub(crate) fn new_trace(text: &str) -> Option<Trace> {
    let text = ReleasedText::new(text).ok()?;
    let preview = preview(text.as_str());
    Some(Trace {
        id: TraceId::new(Uuid::new_v4().to_string()),
        preview,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        source: TraceSource::MainInput,
        text,
    })
}
