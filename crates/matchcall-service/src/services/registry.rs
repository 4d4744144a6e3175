//! Match registry
//!
//! Authoritative, concurrently readable store of every match. All status
//! changes go through [`MatchRegistry::transition`], which enforces the closed
//! transition table, persists the new status and publishes the change.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use matchcall_core::events::{MatchCreatedEvent, MatchStatusChangedEvent};
use matchcall_core::{
    DomainError, DomainEvent, Match, MatchStatus, MatchStatusStore, MatchTransition, Profile,
    Snowflake, SnowflakeGenerator,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::events::EventBus;

/// Tab filter for the matches list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchFilter {
    #[default]
    All,
    /// Still waiting for a call
    Pending,
    Completed,
}

impl MatchFilter {
    pub fn admits(self, status: MatchStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == MatchStatus::Waiting,
            Self::Completed => status == MatchStatus::Completed,
        }
    }
}

/// Shared match store
#[derive(Clone)]
pub struct MatchRegistry {
    matches: Arc<DashMap<Snowflake, Match>>,
    ids: Arc<SnowflakeGenerator>,
    store: Option<Arc<dyn MatchStatusStore>>,
    events: EventBus,
}

impl MatchRegistry {
    pub fn new(
        ids: Arc<SnowflakeGenerator>,
        store: Option<Arc<dyn MatchStatusStore>>,
        events: EventBus,
    ) -> Self {
        Self {
            matches: Arc::new(DashMap::new()),
            ids,
            store,
            events,
        }
    }

    /// Record a fresh mutual match with `profile`; it starts out waiting
    #[instrument(skip(self, profile), fields(profile_id = %profile.id))]
    pub fn create(&self, profile: &Profile) -> Match {
        let matched = Match::new(self.ids.generate(), profile, Utc::now());
        self.matches.insert(matched.id, matched.clone());
        self.persist(matched.id, matched.status());

        info!(match_id = %matched.id, name = %matched.name, "Match created");
        self.events.publish(DomainEvent::MatchCreated(MatchCreatedEvent {
            match_id: matched.id,
            profile_id: matched.profile_id.clone(),
            timestamp: matched.matched_at,
        }));
        matched
    }

    /// Insert an existing match record (e.g. restored from storage)
    pub fn insert(&self, record: Match) {
        self.matches.insert(record.id, record);
    }

    pub fn get(&self, match_id: Snowflake) -> Option<Match> {
        self.matches.get(&match_id).map(|m| m.value().clone())
    }

    pub fn status(&self, match_id: Snowflake) -> Result<MatchStatus, DomainError> {
        self.matches
            .get(&match_id)
            .map(|m| m.status())
            .ok_or(DomainError::MatchNotFound(match_id))
    }

    /// Apply `event` to the match; returns the new status
    ///
    /// A transition outside the table is rejected and leaves the status
    /// untouched.
    #[instrument(skip(self))]
    pub fn transition(
        &self,
        match_id: Snowflake,
        event: MatchTransition,
    ) -> Result<MatchStatus, DomainError> {
        let (from, to) = {
            let mut entry = self
                .matches
                .get_mut(&match_id)
                .ok_or(DomainError::MatchNotFound(match_id))?;
            let from = entry.transition(event).inspect_err(|e| {
                error!(match_id = %match_id, error = %e, "Rejected match transition");
            })?;
            (from, entry.status())
        };

        self.persist(match_id, to);
        info!(match_id = %match_id, %from, %to, "Match status changed");
        self.events
            .publish(DomainEvent::MatchStatusChanged(MatchStatusChangedEvent {
                match_id,
                from,
                to,
                transition: event,
                timestamp: Utc::now(),
            }));
        Ok(to)
    }

    /// Update the last-message summary shown in the matches list
    pub fn record_message(
        &self,
        match_id: Snowflake,
        text: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut entry = self
            .matches
            .get_mut(&match_id)
            .ok_or(DomainError::MatchNotFound(match_id))?;
        entry.record_message(text, at);
        Ok(())
    }

    /// Matches admitted by `filter`, newest first
    pub fn list(&self, filter: MatchFilter) -> Vec<Match> {
        let mut matches: Vec<Match> = self
            .matches
            .iter()
            .filter(|m| filter.admits(m.status()))
            .map(|m| m.value().clone())
            .collect();
        matches.sort_by(|a, b| b.matched_at.cmp(&a.matched_at).then(b.id.cmp(&a.id)));
        matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    fn persist(&self, match_id: Snowflake, status: MatchStatus) {
        if let Some(store) = &self.store {
            store.save_match_status(match_id, status);
        }
    }
}

impl std::fmt::Debug for MatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchRegistry")
            .field("matches", &self.matches.len())
            .field("store", &self.store.is_some())
            .finish()
    }
}
