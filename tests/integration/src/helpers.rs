//! Test helpers for integration tests
//!
//! Provides a harness that wires a lifecycle to recording ports and reads
//! back the event stream.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use matchcall_common::{try_init_tracing_with_config, LifecycleConfig, TracingConfig};
use matchcall_core::{ChatRequestDecision, DomainEvent, MatchStatus, Snowflake};
use matchcall_service::services::{FixedChatDecision, InMemoryStatusStore, StaticProfileSource};
use matchcall_service::{MatchLifecycle, ServiceContext};
use tokio::sync::broadcast;

use crate::fixtures::{profiles, RecordingNotifier, ScriptedDraws};

/// Default deck used by the harness
pub const DECK: [&str; 3] = ["Olivia", "Liam", "Ava"];

/// Fully wired lifecycle plus handles to its recording ports
pub struct TestHarness {
    pub lifecycle: MatchLifecycle,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<InMemoryStatusStore>,
    events: broadcast::Receiver<DomainEvent>,
}

impl TestHarness {
    /// Harness with default config, the default deck and `draws`
    pub fn start(draws: &[f64]) -> Result<Self> {
        Self::builder().draws(draws).build()
    }

    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    /// Advance the paused clock
    pub async fn advance(&self, by: Duration) {
        tokio::time::sleep(by).await;
    }

    /// Events published since the last drain
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Statuses persisted for `match_id`, oldest first
    pub fn status_history(&self, match_id: Snowflake) -> Vec<MatchStatus> {
        self.store.history(match_id)
    }

    /// Like the presented profile and return the new match
    pub fn match_next(&self) -> Result<Snowflake> {
        let evaluation = self.lifecycle.like()?;
        evaluation
            .matched
            .map(|m| m.id)
            .ok_or_else(|| anyhow::anyhow!("draw did not produce a match"))
    }
}

#[derive(Debug)]
pub struct TestHarnessBuilder {
    config: LifecycleConfig,
    draws: Vec<f64>,
    deck: Vec<String>,
    decision: ChatRequestDecision,
}

impl Default for TestHarnessBuilder {
    fn default() -> Self {
        Self {
            config: LifecycleConfig::default(),
            draws: Vec::new(),
            deck: DECK.iter().map(ToString::to_string).collect(),
            decision: ChatRequestDecision::Accept,
        }
    }
}

impl TestHarnessBuilder {
    pub fn config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn draws(mut self, draws: &[f64]) -> Self {
        self.draws = draws.to_vec();
        self
    }

    pub fn deck(mut self, names: &[&str]) -> Self {
        self.deck = names.iter().map(ToString::to_string).collect();
        self
    }

    /// How the peer answers our chat requests
    pub fn peer_decision(mut self, decision: ChatRequestDecision) -> Self {
        self.decision = decision;
        self
    }

    pub fn build(self) -> Result<TestHarness> {
        init_test_tracing();

        let notifier = Arc::new(RecordingNotifier::new());
        let store = Arc::new(InMemoryStatusStore::new());
        let ctx = ServiceContext::builder()
            .config(self.config)
            .notifier(notifier.clone())
            .status_store(store.clone())
            .chat_request_strategy(Arc::new(FixedChatDecision(self.decision)))
            .build()?;
        let events = ctx.subscribe();

        let names: Vec<&str> = self.deck.iter().map(String::as_str).collect();
        let lifecycle = MatchLifecycle::new(
            ctx,
            Box::new(StaticProfileSource::new(profiles(&names))),
            Box::new(ScriptedDraws::new(&self.draws)),
        )?;

        Ok(TestHarness {
            lifecycle,
            notifier,
            store,
            events,
        })
    }
}

/// Install a quiet subscriber once per test binary
pub fn init_test_tracing() {
    let config = TracingConfig {
        level: tracing::Level::WARN,
        ..TracingConfig::default()
    };
    // Another test in the same binary may have installed it already
    let _ = try_init_tracing_with_config(&config);
}

/// Every consecutive pair of statuses must be an edge of the transition graph
pub fn is_valid_status_path(path: &[MatchStatus]) -> bool {
    use matchcall_core::MatchTransition::{
        CallStarted, CancelledBeforeCall, ChatAccepted, CountdownExpired,
    };

    path.first() == Some(&MatchStatus::Waiting)
        && path.windows(2).all(|pair| {
            [CountdownExpired, CancelledBeforeCall, CallStarted, ChatAccepted]
                .into_iter()
                .any(|t| pair[0].apply(t).ok() == Some(pair[1]))
        })
}
