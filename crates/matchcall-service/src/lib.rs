//! # matchcall-service
//!
//! Application layer: the match lifecycle controller. Pure state machines
//! (gesture, countdown, call, chat) driven by a tokio-backed scheduler and
//! coordinated by [`MatchLifecycle`].

pub mod services;

pub use services::{
    CallSession, ChatThread, Deck, Evaluation, GestureOutcome, MatchCountdown,
    MatchDecisionEngine, MatchFilter, MatchLifecycle, MatchRegistry, Scheduler, ScreenKind,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, SwipeDecision,
    SwipeGestureDetector, TimerHandle,
};
