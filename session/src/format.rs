//! Display formatting for trace timestamps.

use chrono::{DateTime, Utc};

/// Relative age for the traces list: minutes under an hour, hours under a
/// day, then a short date.
#[must_use]
pub fn format_trace_time(created_at: &str) -> String {
    relative_trace_time(created_at, Utc::now())
}

/// Pure core of [`format_trace_time`]; `now` is injected so tests need no
/// clock. Unparseable timestamps pass through unchanged.
#[must_use]
pub fn relative_trace_time(created_at: &str, now: DateTime<Utc>) -> String {
    let Ok(created) = DateTime::parse_from_rfc3339(created_at) else {
        return created_at.to_string();
    };
    let created = created.with_timezone(&Utc);

    let minutes = (now - created).num_minutes();
    let hours = minutes / 60;

    if minutes < 60 {
        return format!("{}m ago", minutes.max(1));
    }
    if hours < 24 {
        return format!("{hours}h ago");
    }
    created.format("%d %b").to_string()
}

/// Full date and time for the detail view, e.g. `06 August 2026, 14:30`.
#[must_use]
pub fn format_trace_date_time(created_at: &str) -> String {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(created) => created
            .with_timezone(&Utc)
            .format("%d %B %Y, %H:%M")
            .to_string(),
        Err(_) => created_at.to_string(),
    }
}
