//! Match status and its closed transition table
//!
//! ```text
//! waiting --(countdown expires)-----> expired
//! waiting --(user cancels)----------> expired
//! waiting --(call started)----------> completed
//! completed --(chat accepted)-------> chatting
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Lifecycle status of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Matched, call not started yet
    Waiting,
    /// A call was started
    Completed,
    /// Both sides agreed to keep chatting after the call
    Chatting,
    /// Countdown ran out or the match was cancelled before a call
    Expired,
}

/// Events that move a match between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTransition {
    CountdownExpired,
    CancelledBeforeCall,
    CallStarted,
    ChatAccepted,
}

impl MatchStatus {
    /// Apply a transition, rejecting every edge outside the table
    pub fn apply(self, transition: MatchTransition) -> Result<MatchStatus, DomainError> {
        use MatchStatus::{Chatting, Completed, Expired, Waiting};
        use MatchTransition::{CallStarted, CancelledBeforeCall, ChatAccepted, CountdownExpired};

        match (self, transition) {
            (Waiting, CountdownExpired | CancelledBeforeCall) => Ok(Expired),
            (Waiting, CallStarted) => Ok(Completed),
            (Completed, ChatAccepted) => Ok(Chatting),
            (from, event) => Err(DomainError::InvalidTransition { from, event }),
        }
    }

    /// Check whether a transition is allowed from this status
    #[inline]
    pub fn permits(self, transition: MatchTransition) -> bool {
        self.apply(transition).is_ok()
    }

    /// No outgoing edges
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Chatting | Self::Expired)
    }

    /// A call has happened for this match
    #[inline]
    pub fn has_called(self) -> bool {
        matches!(self, Self::Completed | Self::Chatting)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Completed => "completed",
            Self::Chatting => "chatting",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MatchTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CountdownExpired => "countdown_expired",
            Self::CancelledBeforeCall => "cancelled_before_call",
            Self::CallStarted => "call_started",
            Self::ChatAccepted => "chat_accepted",
        };
        f.write_str(name)
    }
}
