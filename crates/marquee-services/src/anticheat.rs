//! Anti-cheat heuristics for score submissions.
//!
//! Two layers:
//!   1. A hard domain bound on the claimed time. Violations refuse the
//!      submission outright with a validation error, before any storage
//!      access.
//!   2. A plausibility check against the consumed session. Failures never
//!      refuse anything — they only leave the score unverified, so a
//!      legitimate player without a session still gets on the board.
//!
//! This is a deterrent, not a security guarantee.

use thiserror::Error;

use crate::session::SessionSnapshot;

/// Thresholds for the verified-flag decision.
#[derive(Debug, Clone, Copy)]
pub struct AntiCheatPolicy {
    /// Slack over the session duration allowed for a claimed time,
    /// covering network round-trip latency.
    pub grace_ms: u64,
    /// Minimum interaction events a session must have reported.
    pub min_interactions: u32,
}

impl Default for AntiCheatPolicy {
    fn default() -> Self {
        Self {
            grace_ms: 2000,
            min_interactions: 3,
        }
    }
}

/// Hard bounds a claimed time must satisfy for the submission to be
/// accepted at all.
#[derive(Debug, Clone, Copy)]
pub struct TimeBounds {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for TimeBounds {
    fn default() -> Self {
        Self {
            min_ms: 3000,
            max_ms: 600_000,
        }
    }
}

impl TimeBounds {
    pub fn check(&self, claimed_ms: u64) -> Result<(), ValidationError> {
        if claimed_ms < self.min_ms || claimed_ms > self.max_ms {
            return Err(ValidationError::InvalidTime);
        }
        Ok(())
    }
}

/// User-correctable rejection, detected at the boundary before any
/// storage access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields")]
    MissingFields,
    #[error("invalid time value")]
    InvalidTime,
}

/// Decide whether a submission earns the verified flag.
///
/// Policy, in order:
///   - no session (anonymous submission, unknown token, or a token that
///     was already spent) → unverified
///   - a registry entry whose signature no longer re-derives → unverified
///   - the claimed time must not beat the session clock by more than the
///     grace window
///   - the session must have reported at least `min_interactions` events
///
/// Never errors and never rejects; the submission is stored either way.
pub fn evaluate(
    policy: &AntiCheatPolicy,
    claimed_ms: u64,
    session: Option<&SessionSnapshot>,
) -> bool {
    let Some(session) = session else {
        return false;
    };
    if !session.signature_ok {
        return false;
    }
    let session_ms = session.duration.as_millis() as u64;
    claimed_ms <= session_ms + policy.grace_ms && session.interactions >= policy.min_interactions
}
