//! Message entity - one entry of a chat thread

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::entities::{Reaction, ReactionCount, ReactionKind};
use crate::value_objects::Snowflake;

/// Shown in place of a reply target that cannot be resolved
pub const MISSING_REPLY_PLACEHOLDER: &str = "message not found";

/// Who wrote a message or reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The local user
    Me,
    /// The matched peer
    Peer,
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
    reactions: BTreeSet<Reaction>,
    reply_to: Option<Snowflake>,
}

impl Message {
    /// Create a new Message
    pub fn new(id: Snowflake, sender: Sender, text: String) -> Self {
        Self {
            id,
            sender,
            text,
            created_at: Utc::now(),
            reactions: BTreeSet::new(),
            reply_to: None,
        }
    }

    /// Create a reply message; the reference is fixed for the message lifetime
    pub fn new_reply(id: Snowflake, sender: Sender, text: String, reply_to: Snowflake) -> Self {
        Self {
            reply_to: Some(reply_to),
            ..Self::new(id, sender, text)
        }
    }

    #[inline]
    pub fn reply_to(&self) -> Option<Snowflake> {
        self.reply_to
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    pub fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.iter()
    }

    #[inline]
    pub fn has_reaction(&self, kind: ReactionKind, author: Sender) -> bool {
        self.reactions.contains(&Reaction::new(kind, author))
    }

    /// Toggle a reaction; returns true if it is now present
    pub fn toggle_reaction(&mut self, kind: ReactionKind, author: Sender) -> bool {
        let reaction = Reaction::new(kind, author);
        if self.reactions.remove(&reaction) {
            false
        } else {
            self.reactions.insert(reaction);
            true
        }
    }

    /// Per-kind counts, skipping kinds nobody used
    pub fn reaction_counts(&self, viewer: Sender) -> Vec<ReactionCount> {
        ReactionKind::ALL
            .iter()
            .filter_map(|&kind| {
                let count = self.reactions.iter().filter(|r| r.kind == kind).count() as u32;
                (count > 0).then(|| ReactionCount {
                    kind,
                    count,
                    me: self.has_reaction(kind, viewer),
                })
            })
            .collect()
    }

    /// Get a truncated preview of the message text
    pub fn preview(&self, max_len: usize) -> &str {
        if self.text.len() <= max_len {
            &self.text
        } else {
            let mut end = max_len;
            while !self.text.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.text[..end]
        }
    }
}

/// Display form of a reply target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReplyPreview {
    Found {
        message_id: Snowflake,
        sender: Sender,
        excerpt: String,
    },
    Missing {
        message_id: Snowflake,
    },
}

impl ReplyPreview {
    pub fn text(&self) -> &str {
        match self {
            Self::Found { excerpt, .. } => excerpt,
            Self::Missing { .. } => MISSING_REPLY_PLACEHOLDER,
        }
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> Message {
        Message::new(Snowflake::new(1), Sender::Me, text.to_string())
    }

    #[test]
    fn test_message_reply() {
        let reply = Message::new_reply(
            Snowflake::new(2),
            Sender::Peer,
            "This is a reply".to_string(),
            Snowflake::new(1),
        );
        assert!(reply.is_reply());
        assert_eq!(reply.reply_to(), Some(Snowflake::new(1)));
        assert!(!msg("hi").is_reply());
    }

    #[test]
    fn test_toggle_reaction_pairs_cancel_out() {
        let mut m = msg("hi");
        m.toggle_reaction(ReactionKind::Like, Sender::Peer);
        let before: Vec<_> = m.reactions().copied().collect();

        assert!(m.toggle_reaction(ReactionKind::Heart, Sender::Me));
        assert!(!m.toggle_reaction(ReactionKind::Heart, Sender::Me));

        let after: Vec<_> = m.reactions().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reaction_counts() {
        let mut m = msg("hi");
        m.toggle_reaction(ReactionKind::Heart, Sender::Me);
        m.toggle_reaction(ReactionKind::Heart, Sender::Peer);
        m.toggle_reaction(ReactionKind::Like, Sender::Peer);

        let counts = m.reaction_counts(Sender::Me);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].kind, ReactionKind::Heart);
        assert_eq!(counts[0].count, 2);
        assert!(counts[0].me);
        assert!(!counts[1].me);
    }

    #[test]
    fn test_message_preview() {
        let m = msg("Hello, world!");
        assert_eq!(m.preview(5), "Hello");
        assert_eq!(m.preview(100), "Hello, world!");
    }

    #[test]
    fn test_missing_reply_placeholder() {
        let preview = ReplyPreview::Missing {
            message_id: Snowflake::new(9),
        };
        assert!(preview.is_missing());
        assert_eq!(preview.text(), "message not found");
    }
}
