//! Match countdown
//!
//! A waiting match has a bounded window to start a call. Remaining time is
//! derived from the instant the countdown started, so late or skipped ticks
//! never stretch the window. Expiry is reported exactly once.

use matchcall_core::{format_clock, DomainError};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Idle,
    Running,
    Expired,
    Cancelled,
}

/// What a tick observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running with this many whole seconds left
    Remaining(u64),
    /// Reached zero on this tick
    Expired,
    /// Not running; the tick has no effect
    Inactive,
}

#[derive(Debug, Clone)]
pub struct MatchCountdown {
    phase: CountdownPhase,
    limit: u64,
    remaining: u64,
    urgent_below: u64,
    started_at: Option<Instant>,
}

impl MatchCountdown {
    pub fn new(urgent_below: u64) -> Self {
        Self {
            phase: CountdownPhase::Idle,
            limit: 0,
            remaining: 0,
            urgent_below,
            started_at: None,
        }
    }

    /// idle -> running with `limit` seconds
    pub fn start(&mut self, limit: u64, now: Instant) -> Result<(), DomainError> {
        if self.phase != CountdownPhase::Idle {
            return Err(DomainError::ValidationError(format!(
                "countdown already {:?}",
                self.phase
            )));
        }
        self.phase = CountdownPhase::Running;
        self.limit = limit;
        self.remaining = limit;
        self.started_at = Some(now);
        Ok(())
    }

    /// Recompute remaining time at `now`
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let started_at = match (self.phase, self.started_at) {
            (CountdownPhase::Running, Some(at)) => at,
            _ => return TickOutcome::Inactive,
        };

        let elapsed = now.saturating_duration_since(started_at).as_secs();
        // never count back up, even if the clock is observed out of order
        self.remaining = self.limit.saturating_sub(elapsed).min(self.remaining);

        if self.remaining == 0 {
            self.phase = CountdownPhase::Expired;
            TickOutcome::Expired
        } else {
            TickOutcome::Remaining(self.remaining)
        }
    }

    /// running -> cancelled; returns the seconds that were left
    pub fn cancel(&mut self) -> Result<u64, DomainError> {
        if self.phase != CountdownPhase::Running {
            return Err(DomainError::CountdownNotRunning);
        }
        self.phase = CountdownPhase::Cancelled;
        Ok(self.remaining)
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == CountdownPhase::Running
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Fraction of the window still left, 1.0 at start
    pub fn progress(&self) -> f64 {
        if self.limit == 0 {
            0.0
        } else {
            self.remaining as f64 / self.limit as f64
        }
    }

    pub fn is_urgent(&self) -> bool {
        self.is_running() && self.remaining < self.urgent_below
    }

    /// Remaining time as `M:SS`
    pub fn display(&self) -> String {
        format_clock(self.remaining)
    }
}
