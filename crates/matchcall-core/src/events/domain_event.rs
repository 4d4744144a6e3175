//! Domain events - emitted when lifecycle state changes
//!
//! Presentation layers subscribe to these to re-render; tests use them to
//! observe the exact sequence of status changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{ReactionKind, Sender};
use crate::value_objects::{ChatRequestState, MatchStatus, MatchTransition, Snowflake};

/// All possible domain events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    // =========================================================================
    // Match Events
    // =========================================================================
    MatchCreated(MatchCreatedEvent),
    MatchStatusChanged(MatchStatusChangedEvent),

    // =========================================================================
    // Countdown Events
    // =========================================================================
    CountdownStarted(CountdownEvent),
    CountdownCancelled(CountdownEvent),
    CountdownExpired(CountdownEvent),

    // =========================================================================
    // Call Events
    // =========================================================================
    CallStarted(CallEvent),
    CallEnded(CallEvent),
    ChatRequestChanged(ChatRequestChangedEvent),

    // =========================================================================
    // Chat Events
    // =========================================================================
    MessageAppended(MessageAppendedEvent),
    ReactionToggled(ReactionToggledEvent),

    // =========================================================================
    // Deck Events
    // =========================================================================
    DeckExhausted(DeckEvent),
    DeckReplenished(DeckEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MatchCreated(_) => "MATCH_CREATED",
            Self::MatchStatusChanged(_) => "MATCH_STATUS_CHANGED",
            Self::CountdownStarted(_) => "COUNTDOWN_STARTED",
            Self::CountdownCancelled(_) => "COUNTDOWN_CANCELLED",
            Self::CountdownExpired(_) => "COUNTDOWN_EXPIRED",
            Self::CallStarted(_) => "CALL_STARTED",
            Self::CallEnded(_) => "CALL_ENDED",
            Self::ChatRequestChanged(_) => "CHAT_REQUEST_CHANGED",
            Self::MessageAppended(_) => "MESSAGE_APPENDED",
            Self::ReactionToggled(_) => "REACTION_TOGGLED",
            Self::DeckExhausted(_) => "DECK_EXHAUSTED",
            Self::DeckReplenished(_) => "DECK_REPLENISHED",
        }
    }

    /// Match the event belongs to, if any
    pub fn match_id(&self) -> Option<Snowflake> {
        match self {
            Self::MatchCreated(e) => Some(e.match_id),
            Self::MatchStatusChanged(e) => Some(e.match_id),
            Self::CountdownStarted(e) | Self::CountdownCancelled(e) | Self::CountdownExpired(e) => {
                Some(e.match_id)
            }
            Self::CallStarted(e) | Self::CallEnded(e) => Some(e.match_id),
            Self::ChatRequestChanged(e) => Some(e.match_id),
            Self::MessageAppended(e) => Some(e.match_id),
            Self::ReactionToggled(e) => Some(e.match_id),
            Self::DeckExhausted(_) | Self::DeckReplenished(_) => None,
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MatchCreated(e) => e.timestamp,
            Self::MatchStatusChanged(e) => e.timestamp,
            Self::CountdownStarted(e) | Self::CountdownCancelled(e) | Self::CountdownExpired(e) => {
                e.timestamp
            }
            Self::CallStarted(e) | Self::CallEnded(e) => e.timestamp,
            Self::ChatRequestChanged(e) => e.timestamp,
            Self::MessageAppended(e) => e.timestamp,
            Self::ReactionToggled(e) => e.timestamp,
            Self::DeckExhausted(e) | Self::DeckReplenished(e) => e.timestamp,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCreatedEvent {
    pub match_id: Snowflake,
    pub profile_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatusChangedEvent {
    pub match_id: Snowflake,
    pub from: MatchStatus,
    pub to: MatchStatus,
    pub transition: MatchTransition,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownEvent {
    pub match_id: Snowflake,
    pub remaining: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    pub match_id: Snowflake,
    pub elapsed: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequestChangedEvent {
    pub match_id: Snowflake,
    pub state: ChatRequestState,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAppendedEvent {
    pub match_id: Snowflake,
    pub message_id: Snowflake,
    pub sender: Sender,
    pub reply_to: Option<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionToggledEvent {
    pub match_id: Snowflake,
    pub message_id: Snowflake,
    pub kind: ReactionKind,
    pub author: Sender,
    pub added: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckEvent {
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Event Creation Helpers
// ============================================================================

impl CountdownEvent {
    pub fn new(match_id: Snowflake, remaining: u64) -> Self {
        Self {
            match_id,
            remaining,
            timestamp: Utc::now(),
        }
    }
}

impl CallEvent {
    pub fn new(match_id: Snowflake, elapsed: u64) -> Self {
        Self {
            match_id,
            elapsed,
            timestamp: Utc::now(),
        }
    }
}

impl ChatRequestChangedEvent {
    pub fn new(match_id: Snowflake, state: ChatRequestState) -> Self {
        Self {
            match_id,
            state,
            timestamp: Utc::now(),
        }
    }
}

impl DeckEvent {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
        }
    }
}
