//! Service context - dependency container for the lifecycle
//!
//! Holds the configuration, the match registry, the shared id generator, the
//! event bus and the outbound ports. Cheap to clone.

use std::sync::Arc;

use matchcall_common::LifecycleConfig;
use matchcall_core::{
    ChatRequestStrategy, DomainEvent, MatchStatusStore, NotificationKind, NotificationSink,
    ReplyStrategy, Snowflake, SnowflakeGenerator,
};
use tokio::sync::broadcast;

use super::adapters::{CannedReply, FixedChatDecision, TracingNotifier};
use super::error::{ServiceError, ServiceResult};
use super::events::{EventBus, DEFAULT_EVENT_BUFFER};
use super::registry::MatchRegistry;

/// Service context containing all dependencies
///
/// This is the container handed to [`super::lifecycle::MatchLifecycle`]. It
/// provides access to:
/// - Lifecycle tunables
/// - The match registry
/// - Notification, reply and chat-request ports
/// - Snowflake generator for ids
/// - The domain event bus
#[derive(Clone)]
pub struct ServiceContext {
    config: LifecycleConfig,
    registry: MatchRegistry,

    // Ports
    notifier: Arc<dyn NotificationSink>,
    reply_strategy: Arc<dyn ReplyStrategy>,
    chat_request_strategy: Arc<dyn ChatRequestStrategy>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    events: EventBus,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Configuration ===

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    // === Registry ===

    pub fn registry(&self) -> &MatchRegistry {
        &self.registry
    }

    // === Ports ===

    /// Raise a user-visible notification
    pub fn notify(&self, kind: NotificationKind, title: &str, body: &str) {
        self.notifier.notify(kind, title, body);
    }

    pub fn reply_strategy(&self) -> &dyn ReplyStrategy {
        self.reply_strategy.as_ref()
    }

    pub fn chat_request_strategy(&self) -> &dyn ChatRequestStrategy {
        self.chat_request_strategy.as_ref()
    }

    // === Ids ===

    pub fn snowflake_generator(&self) -> &Arc<SnowflakeGenerator> {
        &self.snowflake_generator
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    // === Events ===

    pub fn publish(&self, event: DomainEvent) {
        self.events.publish(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("ports", &"...")
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// Every port has an in-memory default, so `ServiceContext::builder().build()`
/// yields a working headless context.
pub struct ServiceContextBuilder {
    config: LifecycleConfig,
    notifier: Option<Arc<dyn NotificationSink>>,
    status_store: Option<Arc<dyn MatchStatusStore>>,
    reply_strategy: Option<Arc<dyn ReplyStrategy>>,
    chat_request_strategy: Option<Arc<dyn ChatRequestStrategy>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    event_buffer: usize,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            config: LifecycleConfig::default(),
            notifier: None,
            status_store: None,
            reply_strategy: None,
            chat_request_strategy: None,
            snowflake_generator: None,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    pub fn config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn status_store(mut self, store: Arc<dyn MatchStatusStore>) -> Self {
        self.status_store = Some(store);
        self
    }

    pub fn reply_strategy(mut self, strategy: Arc<dyn ReplyStrategy>) -> Self {
        self.reply_strategy = Some(strategy);
        self
    }

    pub fn chat_request_strategy(mut self, strategy: Arc<dyn ChatRequestStrategy>) -> Self {
        self.chat_request_strategy = Some(strategy);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn event_buffer(mut self, buffer: usize) -> Self {
        self.event_buffer = buffer;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the configuration is inconsistent
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let config = self.config;
        if config.countdown_secs == 0 {
            return Err(ServiceError::validation("countdown_secs must be positive"));
        }
        if !(0.0..=1.0).contains(&config.match_threshold) {
            return Err(ServiceError::validation(
                "match_threshold must be within [0, 1]",
            ));
        }
        if config.tap_slop < 0.0 || config.tap_slop >= config.swipe_threshold {
            return Err(ServiceError::validation(
                "tap_slop must be non-negative and below swipe_threshold",
            ));
        }

        let snowflake_generator = self
            .snowflake_generator
            .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default()));
        let events = EventBus::new(self.event_buffer);
        let registry = MatchRegistry::new(
            snowflake_generator.clone(),
            self.status_store,
            events.clone(),
        );

        Ok(ServiceContext {
            config,
            registry,
            notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            reply_strategy: self
                .reply_strategy
                .unwrap_or_else(|| Arc::new(CannedReply::default())),
            chat_request_strategy: self
                .chat_request_strategy
                .unwrap_or_else(|| Arc::new(FixedChatDecision::default())),
            snowflake_generator,
            events,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
