//! Ports - interfaces to collaborators outside the lifecycle core

mod ports;

pub use ports::{
    ChatRequestDecision, ChatRequestStrategy, DeckExhausted, DrawSource, MatchStatusStore,
    NotificationKind, NotificationSink, ProfileSource, ReplyStrategy,
};
