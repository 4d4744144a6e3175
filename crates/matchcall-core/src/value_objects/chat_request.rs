//! Post-call "keep chatting" negotiation state

use serde::{Deserialize, Serialize};

/// Sub-state of the continue-chatting request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRequestState {
    #[default]
    None,
    /// Local user asked, waiting for the peer
    RequestedByMe,
    /// Peer asked, waiting for the local user
    Received,
    Accepted,
}

impl ChatRequestState {
    /// A request is outstanding in either direction
    #[inline]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::RequestedByMe | Self::Received)
    }

    #[inline]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}
