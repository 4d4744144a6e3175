//! Integration test utilities for the match lifecycle
//!
//! Drives a full [`matchcall_service::MatchLifecycle`] on a paused tokio
//! clock with scripted draws and recording ports.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
