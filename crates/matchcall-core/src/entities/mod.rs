//! Domain entities - core business objects

mod match_record;
mod message;
mod profile;
mod reaction;

pub use match_record::{LastMessage, Match};
pub use message::{Message, ReplyPreview, Sender, MISSING_REPLY_PLACEHOLDER};
pub use profile::{ImageCursor, Profile};
pub use reaction::{Reaction, ReactionCount, ReactionKind};
