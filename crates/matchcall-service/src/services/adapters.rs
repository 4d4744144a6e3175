//! Default port implementations
//!
//! In-memory and tracing-backed collaborators used when no host application
//! supplies its own.

use matchcall_core::{
    ChatRequestDecision, ChatRequestStrategy, DeckExhausted, Match, MatchStatus,
    MatchStatusStore, Message, NotificationKind, NotificationSink, Profile, ProfileSource,
    ReplyStrategy, Snowflake,
};
use parking_lot::Mutex;
use tracing::{info, warn};

/// Fixed list of profiles served in order
#[derive(Debug, Clone)]
pub struct StaticProfileSource {
    profiles: Vec<Profile>,
    cursor: usize,
}

impl StaticProfileSource {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles,
            cursor: 0,
        }
    }

    /// Four sample profiles
    pub fn demo() -> Self {
        Self::new(vec![
            Profile::new("1", "Sophia", 28)
                .with_bio("Adventurous soul who loves hiking, photography, and trying new cuisines.")
                .with_distance("3 miles away")
                .with_images(["sophia-1.jpg", "sophia-2.jpg"])
                .with_interests(["Hiking", "Photography", "Cooking", "Travel", "Yoga"]),
            Profile::new("2", "James", 30)
                .with_bio("Tech enthusiast and weekend musician. Coffee addict.")
                .with_distance("5 miles away")
                .with_images(["james-1.jpg", "james-2.jpg"])
                .with_interests(["Music", "Technology", "Coffee", "Road Trips", "Reading"]),
            Profile::new("3", "Emma", 26)
                .with_bio("Art gallery curator with a passion for indie films and vintage fashion.")
                .with_distance("7 miles away")
                .with_images(["emma-1.jpg", "emma-2.jpg"])
                .with_interests(["Art", "Film", "Fashion", "Reading", "Museums"]),
            Profile::new("4", "Michael", 32)
                .with_bio("Former athlete turned fitness coach. Seeking genuine connections.")
                .with_distance("2 miles away")
                .with_images(["michael-1.jpg", "michael-2.jpg"])
                .with_interests(["Fitness", "Nutrition", "Sports", "Cooking", "Hiking"]),
        ])
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileSource for StaticProfileSource {
    fn next_profile(&mut self) -> Result<Profile, DeckExhausted> {
        let profile = self.profiles.get(self.cursor).cloned().ok_or(DeckExhausted)?;
        self.cursor += 1;
        Ok(profile)
    }

    fn replenish(&mut self) {
        self.cursor = 0;
    }
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, body: &str) {
        match kind {
            NotificationKind::Info => info!(title, body, "Notification"),
            NotificationKind::Error => warn!(title, body, "Notification"),
        }
    }
}

/// Keeps every saved status in memory
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    saved: Mutex<Vec<(Snowflake, MatchStatus)>>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses saved for `match_id`, oldest first
    pub fn history(&self, match_id: Snowflake) -> Vec<MatchStatus> {
        self.saved
            .lock()
            .iter()
            .filter(|(id, _)| *id == match_id)
            .map(|(_, status)| *status)
            .collect()
    }

    pub fn latest(&self, match_id: Snowflake) -> Option<MatchStatus> {
        self.history(match_id).last().copied()
    }
}

impl MatchStatusStore for InMemoryStatusStore {
    fn save_match_status(&self, match_id: Snowflake, status: MatchStatus) {
        self.saved.lock().push((match_id, status));
    }
}

/// Answers every message with the same text
#[derive(Debug, Clone)]
pub struct CannedReply {
    text: String,
}

impl CannedReply {
    pub const DEFAULT_TEXT: &'static str = "Thanks for the message! I'm enjoying our conversation.";

    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for CannedReply {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TEXT)
    }
}

impl ReplyStrategy for CannedReply {
    fn reply_to(&self, _message: &Message) -> Option<String> {
        Some(self.text.clone())
    }
}

/// Peer that always gives the same answer to a chat request
#[derive(Debug, Clone, Copy)]
pub struct FixedChatDecision(pub ChatRequestDecision);

impl Default for FixedChatDecision {
    fn default() -> Self {
        Self(ChatRequestDecision::Accept)
    }
}

impl ChatRequestStrategy for FixedChatDecision {
    fn decide(&self, _matched: &Match) -> ChatRequestDecision {
        self.0
    }
}
