//! The release ritual's interaction state machine.
//!
//! All gesture handling collapses into small pure transition functions, so
//! the legal sequences are testable without a renderer or timer harness and
//! illegal sequences (starting a hold while idle, cancelling a committing
//! release) are inert rather than errors.

/// Interaction phase for a single in-flight piece of text.
///
/// Transient UI state owned by the session; never persisted. Exactly one
/// phase is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RitualPhase {
    #[default]
    Idle,
    Armed,
    Holding,
    Released,
}

/// Arm the release affordance.
///
/// Arms only when there is input and the previous release is not still on
/// screen; any other combination leaves the phase unchanged.
#[must_use]
pub fn next_phase_on_arm(current: RitualPhase, has_input: bool) -> RitualPhase {
    if !has_input || current == RitualPhase::Released {
        return current;
    }
    RitualPhase::Armed
}

/// Begin the hold gesture. Only an armed session can start holding.
#[must_use]
pub fn next_phase_on_hold_start(current: RitualPhase) -> RitualPhase {
    if current != RitualPhase::Armed {
        return current;
    }
    RitualPhase::Holding
}

/// End the hold gesture early.
///
/// Returns to armed only when a hold is in progress and no release is
/// committing; once a release is committing, cancellation is ignored.
#[must_use]
pub fn next_phase_on_hold_cancel(current: RitualPhase, is_releasing: bool) -> RitualPhase {
    if is_releasing {
        return current;
    }
    if current != RitualPhase::Holding {
        return current;
    }
    RitualPhase::Armed
}

/// Hint copy shown under the editor, a pure function of the phase.
#[must_use]
pub const fn release_hint(current: RitualPhase) -> &'static str {
    match current {
        RitualPhase::Holding => "The words will fade as you let them go...",
        RitualPhase::Released => "It stays, quietly.",
        RitualPhase::Idle | RitualPhase::Armed => "UNSAID, UNDONE, UNSENT",
    }
}
