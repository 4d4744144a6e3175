//! Call session
//!
//! One video call with a matched peer. Media and panel controls are plain
//! toggles; the "keep chatting" request is a small protocol of its own whose
//! availability depends on the configured [`ChatRequestPolicy`].

use matchcall_common::ChatRequestPolicy;
use matchcall_core::{format_clock, ChatRequestDecision, ChatRequestState, DomainError, Snowflake};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Active,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioState {
    #[default]
    Unmuted,
    Muted,
}

impl AudioState {
    fn toggled(self) -> Self {
        match self {
            Self::Unmuted => Self::Muted,
            Self::Muted => Self::Unmuted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoState {
    #[default]
    On,
    Off,
}

impl VideoState {
    fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPanel {
    #[default]
    Closed,
    Open,
}

impl ChatPanel {
    fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallSession {
    match_id: Snowflake,
    policy: ChatRequestPolicy,
    phase: CallPhase,
    started_at: Instant,
    elapsed: u64,
    audio: AudioState,
    video: VideoState,
    panel: ChatPanel,
    chat_request: ChatRequestState,
    request_epoch: u64,
}

impl CallSession {
    pub fn new(match_id: Snowflake, policy: ChatRequestPolicy, now: Instant) -> Self {
        Self {
            match_id,
            policy,
            phase: CallPhase::Active,
            started_at: now,
            elapsed: 0,
            audio: AudioState::default(),
            video: VideoState::default(),
            panel: ChatPanel::default(),
            chat_request: ChatRequestState::None,
            request_epoch: 0,
        }
    }

    pub fn match_id(&self) -> Snowflake {
        self.match_id
    }

    /// Recompute elapsed seconds; `None` once the call has ended
    pub fn tick(&mut self, now: Instant) -> Option<u64> {
        if self.phase != CallPhase::Active {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.started_at).as_secs();
        self.elapsed = self.elapsed.max(elapsed);
        Some(self.elapsed)
    }

    /// Hang up; returns the final elapsed seconds
    pub fn end(&mut self, now: Instant) -> Result<u64, DomainError> {
        self.tick(now).ok_or(DomainError::NoActiveCall)?;
        self.phase = CallPhase::Ended;
        self.panel = ChatPanel::Closed;
        Ok(self.elapsed)
    }

    pub fn toggle_mute(&mut self) -> Result<AudioState, DomainError> {
        self.ensure_active()?;
        self.audio = self.audio.toggled();
        Ok(self.audio)
    }

    pub fn toggle_video(&mut self) -> Result<VideoState, DomainError> {
        self.ensure_active()?;
        self.video = self.video.toggled();
        Ok(self.video)
    }

    pub fn toggle_chat_panel(&mut self) -> Result<ChatPanel, DomainError> {
        self.ensure_active()?;
        self.panel = self.panel.toggled();
        Ok(self.panel)
    }

    /// Whether the keep-chatting request may be issued right now
    pub fn chat_request_window(&self) -> Result<(), DomainError> {
        match self.policy {
            ChatRequestPolicy::AfterCall if self.phase == CallPhase::Active => Err(
                DomainError::ChatRequestUnavailable("available once the call ends".to_string()),
            ),
            ChatRequestPolicy::DuringCall { min_elapsed_secs }
                if self.elapsed < min_elapsed_secs =>
            {
                Err(DomainError::ChatRequestUnavailable(format!(
                    "available after {min_elapsed_secs}s of call"
                )))
            }
            _ => Ok(()),
        }
    }

    /// none -> requested-by-me; returns the epoch the peer's answer must carry
    pub fn request_chat(&mut self) -> Result<u64, DomainError> {
        self.chat_request_window()?;
        self.expect_request_state(ChatRequestState::None)?;
        self.chat_request = ChatRequestState::RequestedByMe;
        self.request_epoch += 1;
        Ok(self.request_epoch)
    }

    /// Only the requester may withdraw; any in-flight answer becomes stale
    pub fn withdraw_chat_request(&mut self) -> Result<(), DomainError> {
        self.expect_request_state(ChatRequestState::RequestedByMe)?;
        self.chat_request = ChatRequestState::None;
        self.request_epoch += 1;
        Ok(())
    }

    /// The peer asked us: none -> received
    pub fn receive_chat_request(&mut self) -> Result<(), DomainError> {
        self.chat_request_window()?;
        self.expect_request_state(ChatRequestState::None)?;
        self.chat_request = ChatRequestState::Received;
        Ok(())
    }

    pub fn accept_chat_request(&mut self) -> Result<(), DomainError> {
        self.expect_request_state(ChatRequestState::Received)?;
        self.chat_request = ChatRequestState::Accepted;
        Ok(())
    }

    pub fn decline_chat_request(&mut self) -> Result<(), DomainError> {
        self.expect_request_state(ChatRequestState::Received)?;
        self.chat_request = ChatRequestState::None;
        Ok(())
    }

    /// Apply the peer's answer to our request
    ///
    /// Returns the new state, or `None` when the answer is stale (withdrawn
    /// or superseded request).
    pub fn peer_answered(
        &mut self,
        epoch: u64,
        decision: ChatRequestDecision,
    ) -> Option<ChatRequestState> {
        if self.chat_request != ChatRequestState::RequestedByMe || epoch != self.request_epoch {
            return None;
        }
        self.chat_request = match decision {
            ChatRequestDecision::Accept => ChatRequestState::Accepted,
            ChatRequestDecision::Decline => ChatRequestState::None,
        };
        Some(self.chat_request)
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == CallPhase::Active
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Elapsed time as `M:SS`
    pub fn display_elapsed(&self) -> String {
        format_clock(self.elapsed)
    }

    pub fn audio(&self) -> AudioState {
        self.audio
    }

    pub fn video(&self) -> VideoState {
        self.video
    }

    pub fn panel(&self) -> ChatPanel {
        self.panel
    }

    pub fn chat_request(&self) -> ChatRequestState {
        self.chat_request
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::NoActiveCall)
        }
    }

    fn expect_request_state(&self, expected: ChatRequestState) -> Result<(), DomainError> {
        if self.chat_request == expected {
            Ok(())
        } else {
            Err(DomainError::ChatRequestConflict(self.chat_request))
        }
    }
}
