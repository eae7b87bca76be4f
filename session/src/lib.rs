//! Interaction session for unhappened.
//!
//! Owns the transient ritual state - phase, draft, timers, the re-entry
//! guard - and drives persistence through the `TraceStore` contract. The UI
//! layer forwards gestures and ticks the session once per frame; everything
//! else happens here.

mod config;
mod format;
mod session;
mod timer;

pub use config::MotionConfig;
pub use format::{format_trace_date_time, format_trace_time, relative_trace_time};
pub use session::RitualSession;
