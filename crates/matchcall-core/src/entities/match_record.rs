//! Match entity - a mutual accept awaiting, having had, or having missed a call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Profile;
use crate::error::DomainError;
use crate::value_objects::{relative_age, MatchStatus, MatchTransition, Snowflake};

/// Summary of the latest chat message, for match lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMessage {
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Match entity
///
/// Status only changes through [`Match::transition`], which enforces the
/// closed transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Snowflake,
    pub profile_id: String,
    pub name: String,
    pub image: Option<String>,
    status: MatchStatus,
    pub matched_at: DateTime<Utc>,
    pub last_message: Option<LastMessage>,
}

impl Match {
    /// Create a new Match in `waiting` status
    pub fn new(id: Snowflake, profile: &Profile, matched_at: DateTime<Utc>) -> Self {
        Self {
            id,
            profile_id: profile.id.clone(),
            name: profile.name.clone(),
            image: profile.primary_image().map(str::to_owned),
            status: MatchStatus::Waiting,
            matched_at,
            last_message: None,
        }
    }

    #[inline]
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Apply a status transition, returning the previous status
    pub fn transition(&mut self, event: MatchTransition) -> Result<MatchStatus, DomainError> {
        let previous = self.status;
        self.status = previous.apply(event)?;
        Ok(previous)
    }

    /// Record the latest message shown in match lists
    pub fn record_message(&mut self, text: &str, at: DateTime<Utc>) {
        self.last_message = Some(LastMessage {
            text: text.to_owned(),
            at,
        });
    }

    /// Age of the match, e.g. "10m ago"
    pub fn relative_age(&self, now: DateTime<Utc>) -> String {
        relative_age(self.matched_at, now)
    }
}
