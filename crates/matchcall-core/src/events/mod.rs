//! Domain events

mod domain_event;

pub use domain_event::{
    CallEvent, ChatRequestChangedEvent, CountdownEvent, DeckEvent, DomainEvent, MatchCreatedEvent,
    MatchStatusChangedEvent, MessageAppendedEvent, ReactionToggledEvent,
};
