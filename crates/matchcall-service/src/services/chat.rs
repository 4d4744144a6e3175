//! Chat thread for one match
//!
//! Holds the ordered messages, the draft's reply target and the tickets of
//! simulated peer replies still in flight. Timers live elsewhere: a delivered
//! ticket is honored only while it is still pending, so tearing the thread
//! down silently voids every outstanding reply.

use matchcall_core::{
    DomainError, Message, ReactionCount, ReactionKind, ReplyPreview, ReplyStrategy, Sender,
    Snowflake, SnowflakeGenerator,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Longest excerpt shown in a reply preview
pub const REPLY_EXCERPT_LEN: usize = 60;

/// A simulated peer reply waiting to be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReply {
    pub ticket: u64,
    /// The message being answered
    pub answering: Snowflake,
}

#[derive(Debug)]
pub struct ChatThread {
    match_id: Snowflake,
    ids: Arc<SnowflakeGenerator>,
    messages: Vec<Message>,
    positions: HashMap<Snowflake, usize>,
    reply_target: Option<Snowflake>,
    pending: BTreeMap<u64, Snowflake>,
    next_ticket: u64,
    open: bool,
}

impl ChatThread {
    pub fn new(match_id: Snowflake, ids: Arc<SnowflakeGenerator>) -> Self {
        Self {
            match_id,
            ids,
            messages: Vec::new(),
            positions: HashMap::new(),
            reply_target: None,
            pending: BTreeMap::new(),
            next_ticket: 0,
            open: true,
        }
    }

    pub fn match_id(&self) -> Snowflake {
        self.match_id
    }

    /// Send a message of our own
    ///
    /// Blank text is ignored (`Ok(None)`) and keeps the reply target. The
    /// message answers `reply_to` when given, else the selected reply
    /// target, which is cleared either way.
    pub fn send(
        &mut self,
        text: &str,
        reply_to: Option<Snowflake>,
    ) -> Result<Option<(Message, PendingReply)>, DomainError> {
        self.ensure_open()?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let target = reply_to.or(self.reply_target);
        self.reply_target = None;
        let message = self.append(Sender::Me, text.to_owned(), target);

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.insert(ticket, message.id);
        debug!(match_id = %self.match_id, message_id = %message.id, ticket, "Message sent");

        let pending = PendingReply {
            ticket,
            answering: message.id,
        };
        Ok(Some((message, pending)))
    }

    /// Append a message authored by the peer
    pub fn receive(
        &mut self,
        text: &str,
        reply_to: Option<Snowflake>,
    ) -> Result<Message, DomainError> {
        self.ensure_open()?;
        Ok(self.append(Sender::Peer, text.to_owned(), reply_to))
    }

    /// Deliver the simulated reply for `ticket`
    ///
    /// Returns the appended peer message, or `None` when the ticket was
    /// already used, voided by teardown, or the strategy stays silent.
    pub fn deliver_peer_reply(
        &mut self,
        ticket: u64,
        strategy: &dyn ReplyStrategy,
    ) -> Option<Message> {
        if !self.open {
            return None;
        }
        let answering = self.pending.remove(&ticket)?;
        let text = {
            let original = self.get(answering)?;
            strategy.reply_to(original)?
        };
        Some(self.append(Sender::Peer, text, None))
    }

    /// Toggle our own reaction; returns true when it was added
    pub fn react(&mut self, message_id: Snowflake, kind: ReactionKind) -> Result<bool, DomainError> {
        self.react_as(message_id, kind, Sender::Me)
    }

    pub fn react_as(
        &mut self,
        message_id: Snowflake,
        kind: ReactionKind,
        author: Sender,
    ) -> Result<bool, DomainError> {
        let position = *self
            .positions
            .get(&message_id)
            .ok_or(DomainError::MessageNotFound(message_id))?;
        Ok(self.messages[position].toggle_reaction(kind, author))
    }

    /// Select the message the next send answers
    pub fn reply(&mut self, message_id: Snowflake) -> Result<(), DomainError> {
        if !self.positions.contains_key(&message_id) {
            return Err(DomainError::MessageNotFound(message_id));
        }
        self.reply_target = Some(message_id);
        Ok(())
    }

    pub fn cancel_reply(&mut self) {
        self.reply_target = None;
    }

    pub fn reply_target(&self) -> Option<Snowflake> {
        self.reply_target
    }

    /// Preview of the message `message` answers, if it is a reply
    pub fn resolve_reply(&self, message: &Message) -> Option<ReplyPreview> {
        message.reply_to().map(|id| self.preview(id))
    }

    /// Preview of `message_id`; a placeholder when it is unknown
    pub fn preview(&self, message_id: Snowflake) -> ReplyPreview {
        match self.get(message_id) {
            Some(m) => ReplyPreview::Found {
                message_id,
                sender: m.sender,
                excerpt: m.preview(REPLY_EXCERPT_LEN).to_owned(),
            },
            None => {
                warn!(match_id = %self.match_id, message_id = %message_id, "Reply target missing");
                ReplyPreview::Missing { message_id }
            }
        }
    }

    pub fn reaction_counts(&self, message_id: Snowflake) -> Result<Vec<ReactionCount>, DomainError> {
        self.get(message_id)
            .map(|m| m.reaction_counts(Sender::Me))
            .ok_or(DomainError::MessageNotFound(message_id))
    }

    /// Close the thread, voiding pending replies; returns how many were voided
    pub fn teardown(&mut self) -> usize {
        self.open = false;
        self.reply_target = None;
        let voided = self.pending.len();
        self.pending.clear();
        if voided > 0 {
            debug!(match_id = %self.match_id, voided, "Pending replies voided");
        }
        voided
    }

    /// Reopen a torn-down thread; history is kept
    pub fn reopen(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, message_id: Snowflake) -> Option<&Message> {
        self.positions
            .get(&message_id)
            .map(|&position| &self.messages[position])
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn pending_replies(&self) -> usize {
        self.pending.len()
    }

    fn append(&mut self, sender: Sender, text: String, reply_to: Option<Snowflake>) -> Message {
        let id = self.ids.generate();
        let message = match reply_to {
            Some(target) => Message::new_reply(id, sender, text, target),
            None => Message::new(id, sender, text),
        };
        self.positions.insert(id, self.messages.len());
        self.messages.push(message.clone());
        message
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.open {
            Ok(())
        } else {
            Err(DomainError::NoOpenChat(self.match_id))
        }
    }
}
