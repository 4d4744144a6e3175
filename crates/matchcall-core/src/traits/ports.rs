//! Ports (interfaces) to external collaborators
//!
//! The lifecycle core defines what it needs from profile storage, notification
//! display, persistence and the (simulated) peer; adapters supply the rest.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{Match, Message, Profile};
use crate::value_objects::{MatchStatus, Snowflake};

/// Signal that the profile source has nothing more to present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckExhausted;

// ============================================================================
// Profile Source
// ============================================================================

pub trait ProfileSource: Send {
    /// Next profile to present, or `DeckExhausted`
    fn next_profile(&mut self) -> Result<Profile, DeckExhausted>;

    /// Refill the deck after exhaustion
    fn replenish(&mut self);
}

// ============================================================================
// Notification Sink
// ============================================================================

/// Kind of user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Fire-and-forget notification display
///
/// Implementations must not call back into the lifecycle.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NotificationKind, title: &str, body: &str);
}

// ============================================================================
// Persistence
// ============================================================================

pub trait MatchStatusStore: Send + Sync {
    fn save_match_status(&self, match_id: Snowflake, status: MatchStatus);
}

// ============================================================================
// Randomness and Peer Behavior
// ============================================================================

/// Source of uniform draws in `[0, 1)` for the mutual-match rule
pub trait DrawSource: Send {
    fn draw(&mut self) -> f64;
}

/// Produces the peer's answer to a message sent by the local user
pub trait ReplyStrategy: Send + Sync {
    /// `None` means the peer stays silent
    fn reply_to(&self, message: &Message) -> Option<String>;
}

/// Peer's answer to a continue-chatting request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRequestDecision {
    Accept,
    Decline,
}

/// Decides how the peer answers a continue-chatting request
pub trait ChatRequestStrategy: Send + Sync {
    fn decide(&self, matched: &Match) -> ChatRequestDecision;
}
