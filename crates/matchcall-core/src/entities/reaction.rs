//! Reaction entity - a (kind, author) tag attached to a message

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::Sender;

/// Supported reaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Heart,
    Like,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 2] = [ReactionKind::Heart, ReactionKind::Like];

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Heart => "❤️",
            Self::Like => "👍",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heart => f.write_str("heart"),
            Self::Like => f.write_str("like"),
        }
    }
}

/// Reaction entity; at most one per (kind, author) on a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reaction {
    pub kind: ReactionKind,
    pub author: Sender,
}

impl Reaction {
    pub fn new(kind: ReactionKind, author: Sender) -> Self {
        Self { kind, author }
    }
}

/// Aggregated reaction count for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionCount {
    pub kind: ReactionKind,
    pub count: u32,
    pub me: bool,
}
