//! Lifecycle services
//!
//! Leaf-first: gesture -> engine -> registry -> countdown -> call -> chat,
//! with [`lifecycle::MatchLifecycle`] wiring them to timers and ports.

pub mod adapters;
pub mod call;
pub mod chat;
pub mod context;
pub mod countdown;
pub mod engine;
pub mod error;
pub mod events;
pub mod gesture;
pub mod lifecycle;
pub mod registry;
pub mod scheduler;

// Re-export all services for convenience
pub use adapters::{
    CannedReply, FixedChatDecision, InMemoryStatusStore, StaticProfileSource, TracingNotifier,
};
pub use call::{AudioState, CallPhase, CallSession, ChatPanel, VideoState};
pub use chat::{ChatThread, PendingReply};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use countdown::{CountdownPhase, MatchCountdown, TickOutcome};
pub use engine::{Deck, Evaluation, MatchDecisionEngine, SeededDraws};
pub use error::{ServiceError, ServiceResult};
pub use events::EventBus;
pub use gesture::{GestureOutcome, ImageNavigation, SwipeConfig, SwipeDecision, SwipeGestureDetector};
pub use lifecycle::{CallView, CardView, CountdownView, MatchLifecycle, ScreenKind};
pub use registry::{MatchFilter, MatchRegistry};
pub use scheduler::{Scheduler, TimerControl, TimerHandle};
