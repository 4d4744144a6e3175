//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{ChatRequestState, MatchStatus, MatchTransition, Snowflake};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Match not found: {0}")]
    MatchNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("No match is waiting for a call")]
    NoPendingMatch,

    #[error("No active call")]
    NoActiveCall,

    #[error("No chat is open for match {0}")]
    NoOpenChat(Snowflake),

    // =========================================================================
    // State Machine Violations
    // =========================================================================
    #[error("Invalid match transition: {from} --{event}-->")]
    InvalidTransition {
        from: MatchStatus,
        event: MatchTransition,
    },

    #[error("Countdown is not running")]
    CountdownNotRunning,

    #[error("Another match is already in progress")]
    MatchInProgress,

    #[error("Chat request unavailable: {0}")]
    ChatRequestUnavailable(String),

    #[error("Chat request cannot be changed in state {0:?}")]
    ChatRequestConflict(ChatRequestState),

    // =========================================================================
    // Deck / Validation
    // =========================================================================
    #[error("Profile deck is exhausted")]
    DeckExhausted,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::MatchNotFound(_) => "UNKNOWN_MATCH",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::NoPendingMatch => "NO_PENDING_MATCH",
            Self::NoActiveCall => "NO_ACTIVE_CALL",
            Self::NoOpenChat(_) => "NO_OPEN_CHAT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::CountdownNotRunning => "COUNTDOWN_NOT_RUNNING",
            Self::MatchInProgress => "MATCH_IN_PROGRESS",
            Self::ChatRequestUnavailable(_) => "CHAT_REQUEST_UNAVAILABLE",
            Self::ChatRequestConflict(_) => "CHAT_REQUEST_CONFLICT",
            Self::DeckExhausted => "DECK_EXHAUSTED",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MatchNotFound(_)
                | Self::MessageNotFound(_)
                | Self::NoPendingMatch
                | Self::NoActiveCall
                | Self::NoOpenChat(_)
        )
    }

    /// Check if this is an out-of-graph status transition
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Check if the operation conflicts with the current state
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::CountdownNotRunning
                | Self::MatchInProgress
                | Self::ChatRequestUnavailable(_)
                | Self::ChatRequestConflict(_)
                | Self::DeckExhausted
        )
    }
}
