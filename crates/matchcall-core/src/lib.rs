//! # matchcall-core
//!
//! Domain layer for the match lifecycle: profiles, matches, chat messages and
//! reactions, the closed match-status transition table, domain events, and the
//! ports to external collaborators. No runtime or infrastructure dependencies.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    ImageCursor, LastMessage, Match, Message, Profile, Reaction, ReactionCount, ReactionKind,
    ReplyPreview, Sender,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use traits::{
    ChatRequestDecision, ChatRequestStrategy, DeckExhausted, DrawSource, MatchStatusStore,
    NotificationKind, NotificationSink, ProfileSource, ReplyStrategy,
};
pub use value_objects::{
    format_clock, ChatRequestState, MatchStatus, MatchTransition, Snowflake, SnowflakeGenerator,
    SnowflakeParseError,
};
