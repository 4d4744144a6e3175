//! Match lifecycle controller
//!
//! Wires the gesture detector, decision engine, countdown, call session and
//! chat threads to the scheduler and the outbound ports.
//!
//! All mutable state sits behind one lock. Timer callbacks take the same
//! lock and act only if the screen they were scheduled for is still current
//! (same variant, same epoch, same pending ticket), so a tick that races a
//! cancellation finds nothing to do. The registry is only touched while the
//! lock is held and never calls back. Notification sinks run under the lock
//! and must not call into the lifecycle.

use matchcall_core::events::{
    CallEvent, ChatRequestChangedEvent, CountdownEvent, DeckEvent, MessageAppendedEvent,
    ReactionToggledEvent,
};
use matchcall_core::{
    ChatRequestState, DomainError, DomainEvent, DrawSource, Match, MatchStatus, MatchTransition,
    Message, NotificationKind, Profile, ProfileSource, ReactionCount, ReactionKind, ReplyPreview,
    Sender, Snowflake,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, trace, warn};

use super::call::{AudioState, CallSession, ChatPanel, VideoState};
use super::chat::ChatThread;
use super::context::ServiceContext;
use super::countdown::{MatchCountdown, TickOutcome};
use super::engine::{Deck, Evaluation, MatchDecisionEngine, SeededDraws};
use super::error::{ServiceError, ServiceResult};
use super::gesture::{GestureOutcome, ImageNavigation, SwipeConfig, SwipeDecision, SwipeGestureDetector};
use super::registry::{MatchFilter, MatchRegistry};
use super::scheduler::{Scheduler, TimerControl, TimerHandle};

const TICK: Duration = Duration::from_secs(1);
const DEFAULT_CARD_WIDTH: f64 = 360.0;

/// Which screen the user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Browsing,
    /// Mutual match made, countdown running
    MatchPending,
    InCall,
    /// Call ended, summary and chat request still available
    PostCall,
}

/// Snapshot of the running countdown
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownView {
    pub match_id: Snowflake,
    pub name: String,
    pub remaining: u64,
    pub display: String,
    pub progress: f64,
    pub urgent: bool,
}

/// Snapshot of the current or just-ended call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallView {
    pub match_id: Snowflake,
    pub active: bool,
    pub elapsed: u64,
    pub display: String,
    pub audio: AudioState,
    pub video: VideoState,
    pub panel: ChatPanel,
    pub chat_request: ChatRequestState,
}

/// Visual state of the profile card under the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardView {
    pub offset: f64,
    pub rotation: f64,
    pub opacity: f64,
}

enum Screen {
    Browsing,
    MatchPending {
        match_id: Snowflake,
        countdown: MatchCountdown,
        epoch: u64,
        _ticker: TimerHandle,
    },
    InCall {
        session: CallSession,
        epoch: u64,
        _ticker: TimerHandle,
    },
    PostCall {
        session: CallSession,
    },
}

impl Screen {
    fn kind(&self) -> ScreenKind {
        match self {
            Self::Browsing => ScreenKind::Browsing,
            Self::MatchPending { .. } => ScreenKind::MatchPending,
            Self::InCall { .. } => ScreenKind::InCall,
            Self::PostCall { .. } => ScreenKind::PostCall,
        }
    }

    fn session(&self) -> Option<&CallSession> {
        match self {
            Self::InCall { session, .. } | Self::PostCall { session } => Some(session),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut CallSession> {
        match self {
            Self::InCall { session, .. } | Self::PostCall { session } => Some(session),
            _ => None,
        }
    }
}

struct LifecycleState {
    deck: Deck,
    engine: MatchDecisionEngine,
    gesture: SwipeGestureDetector,
    screen: Screen,
    threads: HashMap<Snowflake, ChatThread>,
    active_chat: Option<Snowflake>,
    next_epoch: u64,
    answer_timer: Option<TimerHandle>,
    reply_timers: HashMap<(Snowflake, u64), TimerHandle>,
    replenish_timer: Option<TimerHandle>,
}

impl LifecycleState {
    fn bump_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }

    fn ensure_browsing(&self) -> Result<(), DomainError> {
        match self.screen {
            Screen::Browsing => Ok(()),
            _ => Err(DomainError::MatchInProgress),
        }
    }

    fn session_mut(&mut self) -> Result<&mut CallSession, DomainError> {
        self.screen.session_mut().ok_or(DomainError::NoActiveCall)
    }

    fn session_for(&mut self, match_id: Snowflake) -> Option<&mut CallSession> {
        self.screen
            .session_mut()
            .filter(|session| session.match_id() == match_id)
    }

    fn active_thread(&mut self) -> ServiceResult<(Snowflake, &mut ChatThread)> {
        let match_id = self
            .active_chat
            .ok_or_else(|| ServiceError::conflict("no chat is open"))?;
        let thread = self
            .threads
            .get_mut(&match_id)
            .ok_or(DomainError::NoOpenChat(match_id))?;
        Ok((match_id, thread))
    }

    /// Close a thread and drop the timers of its pending replies
    fn teardown_thread(&mut self, match_id: Snowflake) {
        if let Some(thread) = self.threads.get_mut(&match_id) {
            thread.teardown();
        }
        self.reply_timers.retain(|(id, _), _| *id != match_id);
    }

    /// Make `match_id` the conversation chat operations apply to
    fn activate_chat(&mut self, match_id: Snowflake, ctx: &ServiceContext) {
        if let Some(previous) = self.active_chat.replace(match_id) {
            if previous != match_id {
                self.teardown_thread(previous);
            }
        }
        self.threads
            .entry(match_id)
            .or_insert_with(|| ChatThread::new(match_id, ctx.snowflake_generator().clone()))
            .reopen();
    }
}

struct Inner {
    me: Weak<Inner>,
    ctx: ServiceContext,
    scheduler: Scheduler,
    state: Mutex<LifecycleState>,
}

/// The match lifecycle controller
///
/// Cheap to clone; clones share the same state. Dropping the last clone
/// cancels every outstanding timer.
#[derive(Clone)]
pub struct MatchLifecycle {
    inner: Arc<Inner>,
}

impl MatchLifecycle {
    /// Create a controller on the current tokio runtime
    pub fn new(
        ctx: ServiceContext,
        profiles: Box<dyn ProfileSource>,
        draws: Box<dyn DrawSource>,
    ) -> ServiceResult<Self> {
        Ok(Self::with_scheduler(
            ctx,
            profiles,
            draws,
            Scheduler::try_current()?,
        ))
    }

    /// Create a controller drawing from the configured seed (or entropy)
    pub fn from_context(ctx: ServiceContext, profiles: Box<dyn ProfileSource>) -> ServiceResult<Self> {
        let draws = SeededDraws::from_config(ctx.config().rng_seed);
        Self::new(ctx, profiles, Box::new(draws))
    }

    pub fn with_scheduler(
        ctx: ServiceContext,
        profiles: Box<dyn ProfileSource>,
        draws: Box<dyn DrawSource>,
        scheduler: Scheduler,
    ) -> Self {
        let config = ctx.config();
        let state = LifecycleState {
            deck: Deck::new(profiles),
            engine: MatchDecisionEngine::new(draws, config.match_threshold),
            gesture: SwipeGestureDetector::new(SwipeConfig::from(config), DEFAULT_CARD_WIDTH),
            screen: Screen::Browsing,
            threads: HashMap::new(),
            active_chat: None,
            next_epoch: 0,
            answer_timer: None,
            reply_timers: HashMap::new(),
            replenish_timer: None,
        };

        let inner = Arc::new_cyclic(|me| Inner {
            me: me.clone(),
            ctx,
            scheduler,
            state: Mutex::new(state),
        });
        {
            let mut guard = inner.state.lock();
            if guard.deck.is_exhausted() {
                inner.schedule_replenish(&mut guard);
            }
        }
        Self { inner }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.inner.ctx
    }

    pub fn registry(&self) -> &MatchRegistry {
        self.inner.ctx.registry()
    }

    pub fn screen(&self) -> ScreenKind {
        self.inner.state.lock().screen.kind()
    }

    /// Matches for a list tab, newest first
    pub fn list_matches(&self, filter: MatchFilter) -> Vec<Match> {
        self.registry().list(filter)
    }

    // =========================================================================
    // Browsing
    // =========================================================================

    pub fn current_profile(&self) -> Option<Profile> {
        self.inner.state.lock().deck.current().cloned()
    }

    pub fn deck_index(&self) -> usize {
        self.inner.state.lock().deck.cursor()
    }

    pub fn image_index(&self) -> usize {
        self.inner.state.lock().deck.image_index()
    }

    pub fn set_card_width(&self, width: f64) {
        self.inner.state.lock().gesture.set_card_width(width);
    }

    /// Pointer down on the card; ignored unless browsing
    pub fn press(&self, x: f64) {
        let mut state = self.inner.state.lock();
        if matches!(state.screen, Screen::Browsing) {
            state.gesture.press(x);
        }
    }

    pub fn drag_to(&self, x: f64) {
        self.inner.state.lock().gesture.move_to(x);
    }

    pub fn card(&self) -> CardView {
        let state = self.inner.state.lock();
        CardView {
            offset: state.gesture.offset(),
            rotation: state.gesture.rotation(),
            opacity: state.gesture.opacity(),
        }
    }

    /// Pointer up; applies the resolved gesture
    pub fn release(&self) -> ServiceResult<Option<GestureOutcome>> {
        let mut guard = self.inner.state.lock();
        let Some(outcome) = guard.gesture.release() else {
            return Ok(None);
        };
        match outcome {
            GestureOutcome::Swipe(SwipeDecision::None) => {}
            GestureOutcome::Swipe(decision) => {
                self.inner.decide(&mut guard, decision)?;
            }
            GestureOutcome::Tap(direction) => {
                guard.deck.navigate(direction);
            }
        }
        Ok(Some(outcome))
    }

    pub fn navigate_image(&self, direction: ImageNavigation) -> bool {
        self.inner.state.lock().deck.navigate(direction)
    }

    /// Like button
    pub fn like(&self) -> ServiceResult<Evaluation> {
        self.decide(SwipeDecision::Accept)
    }

    /// Pass button
    pub fn pass(&self) -> ServiceResult<Evaluation> {
        self.decide(SwipeDecision::Reject)
    }

    pub fn decide(&self, decision: SwipeDecision) -> ServiceResult<Evaluation> {
        let mut guard = self.inner.state.lock();
        self.inner.decide(&mut guard, decision)
    }

    // =========================================================================
    // Countdown
    // =========================================================================

    /// Resume the countdown for a match still waiting for a call
    #[instrument(skip(self))]
    pub fn open_match(&self, match_id: Snowflake) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        guard.ensure_browsing()?;
        let status = self.registry().status(match_id)?;
        if status != MatchStatus::Waiting {
            return Err(ServiceError::conflict(format!(
                "match {match_id} is {status}, not waiting"
            )));
        }
        self.inner.begin_countdown(&mut guard, match_id)
    }

    pub fn countdown(&self) -> Option<CountdownView> {
        let state = self.inner.state.lock();
        let Screen::MatchPending {
            match_id,
            countdown,
            ..
        } = &state.screen
        else {
            return None;
        };
        Some(CountdownView {
            match_id: *match_id,
            name: self.inner.match_name(*match_id),
            remaining: countdown.remaining(),
            display: countdown.display(),
            progress: countdown.progress(),
            urgent: countdown.is_urgent(),
        })
    }

    /// Give up on the pending match; it expires
    #[instrument(skip(self))]
    pub fn cancel_match(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let (match_id, remaining) = match &mut state.screen {
            Screen::MatchPending {
                match_id, countdown, ..
            } => (*match_id, countdown.cancel()?),
            _ => return Err(DomainError::NoPendingMatch.into()),
        };
        state.screen = Screen::Browsing;

        let ctx = &self.inner.ctx;
        ctx.publish(DomainEvent::CountdownCancelled(CountdownEvent::new(
            match_id, remaining,
        )));
        ctx.registry()
            .transition(match_id, MatchTransition::CancelledBeforeCall)?;
        info!(match_id = %match_id, remaining, "Match canceled");
        ctx.notify(
            NotificationKind::Info,
            "Match canceled",
            "You've canceled the match.",
        );
        Ok(())
    }

    /// Start the call for the pending match
    #[instrument(skip(self))]
    pub fn start_call(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let ctx = &self.inner.ctx;

        let match_id = match &state.screen {
            Screen::MatchPending { match_id, .. } => *match_id,
            _ => return Err(DomainError::NoPendingMatch.into()),
        };
        let status = ctx.registry().status(match_id)?;
        if !status.permits(MatchTransition::CallStarted) {
            return Err(DomainError::InvalidTransition {
                from: status,
                event: MatchTransition::CallStarted,
            }
            .into());
        }

        let remaining = match &mut state.screen {
            Screen::MatchPending { countdown, .. } => countdown.cancel()?,
            _ => return Err(DomainError::NoPendingMatch.into()),
        };
        ctx.publish(DomainEvent::CountdownCancelled(CountdownEvent::new(
            match_id, remaining,
        )));
        ctx.registry()
            .transition(match_id, MatchTransition::CallStarted)?;

        let now = Instant::now();
        let session = CallSession::new(match_id, ctx.config().chat_request_policy, now);
        let epoch = state.bump_epoch();
        let me = self.inner.me.clone();
        let ticker = self.inner.scheduler.every(TICK, move |now| {
            me.upgrade()
                .map_or(TimerControl::Stop, |inner| inner.on_call_tick(epoch, now))
        });
        state.screen = Screen::InCall {
            session,
            epoch,
            _ticker: ticker,
        };
        state.activate_chat(match_id, ctx);

        info!(match_id = %match_id, remaining, "Call started");
        ctx.publish(DomainEvent::CallStarted(CallEvent::new(match_id, 0)));
        Ok(())
    }

    // =========================================================================
    // Call
    // =========================================================================

    pub fn call(&self) -> Option<CallView> {
        let state = self.inner.state.lock();
        state.screen.session().map(|session| CallView {
            match_id: session.match_id(),
            active: session.is_active(),
            elapsed: session.elapsed(),
            display: session.display_elapsed(),
            audio: session.audio(),
            video: session.video(),
            panel: session.panel(),
            chat_request: session.chat_request(),
        })
    }

    pub fn toggle_mute(&self) -> ServiceResult<AudioState> {
        Ok(self.inner.state.lock().session_mut()?.toggle_mute()?)
    }

    pub fn toggle_video(&self) -> ServiceResult<VideoState> {
        Ok(self.inner.state.lock().session_mut()?.toggle_video()?)
    }

    pub fn toggle_chat_panel(&self) -> ServiceResult<ChatPanel> {
        Ok(self.inner.state.lock().session_mut()?.toggle_chat_panel()?)
    }

    /// Hang up; returns the call length in seconds
    ///
    /// The match keeps its status. Messages already sent still get their
    /// replies.
    #[instrument(skip(self))]
    pub fn end_call(&self) -> ServiceResult<u64> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let mut session = match std::mem::replace(&mut state.screen, Screen::Browsing) {
            Screen::InCall { session, .. } => session,
            other => {
                state.screen = other;
                return Err(DomainError::NoActiveCall.into());
            }
        };
        let elapsed = session
            .end(Instant::now())
            .unwrap_or_else(|_| session.elapsed());
        let match_id = session.match_id();
        state.screen = Screen::PostCall { session };

        let ctx = &self.inner.ctx;
        info!(match_id = %match_id, elapsed, "Call ended");
        ctx.publish(DomainEvent::CallEnded(CallEvent::new(match_id, elapsed)));
        let name = self.inner.match_name(match_id);
        ctx.notify(
            NotificationKind::Info,
            "Call ended",
            &format!("Your call with {name} has ended."),
        );
        Ok(elapsed)
    }

    /// Leave the post-call screen; the conversation is closed
    ///
    /// The thread is kept only when the match unlocked chat.
    pub fn leave_call(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let match_id = match &state.screen {
            Screen::PostCall { session } => session.match_id(),
            Screen::InCall { .. } => return Err(ServiceError::conflict("call is still active")),
            _ => return Err(DomainError::NoActiveCall.into()),
        };
        state.screen = Screen::Browsing;
        state.answer_timer = None;
        if state.active_chat == Some(match_id) {
            state.active_chat = None;
        }
        state.teardown_thread(match_id);
        let chatting = self
            .registry()
            .status(match_id)
            .is_ok_and(|status| status == MatchStatus::Chatting);
        if !chatting {
            state.threads.remove(&match_id);
        }
        debug!(match_id = %match_id, chatting, "Left call screen");
        Ok(())
    }

    /// Ask the peer to keep chatting; they answer after the reply delay
    #[instrument(skip(self))]
    pub fn request_chat(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let session = state.session_mut()?;
        session.tick(Instant::now());
        let epoch = session.request_chat()?;
        let match_id = session.match_id();

        self.inner.publish_chat_request(match_id, ChatRequestState::RequestedByMe);
        let me = self.inner.me.clone();
        state.answer_timer = Some(self.inner.scheduler.after(
            self.inner.ctx.config().peer_reply_delay,
            move || {
                if let Some(inner) = me.upgrade() {
                    inner.on_chat_request_answer(match_id, epoch);
                }
            },
        ));
        Ok(())
    }

    pub fn withdraw_chat_request(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let session = state.session_mut()?;
        session.withdraw_chat_request()?;
        let match_id = session.match_id();
        state.answer_timer = None;
        self.inner.publish_chat_request(match_id, ChatRequestState::None);
        Ok(())
    }

    /// The peer asked to keep chatting
    pub fn receive_chat_request(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let session = guard.session_mut()?;
        session.tick(Instant::now());
        session.receive_chat_request()?;
        let match_id = session.match_id();
        self.inner.publish_chat_request(match_id, ChatRequestState::Received);
        let name = self.inner.match_name(match_id);
        self.inner.ctx.notify(
            NotificationKind::Info,
            "Chat request",
            &format!("{name} wants to keep chatting."),
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn accept_chat_request(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let session = guard.session_mut()?;
        session.accept_chat_request()?;
        let match_id = session.match_id();
        self.inner.chat_accepted(match_id)
    }

    pub fn decline_chat_request(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let session = guard.session_mut()?;
        session.decline_chat_request()?;
        let match_id = session.match_id();
        self.inner.publish_chat_request(match_id, ChatRequestState::None);
        Ok(())
    }

    // =========================================================================
    // Chat
    // =========================================================================

    /// Open the conversation of a match that unlocked chat
    #[instrument(skip(self))]
    pub fn open_chat(&self, match_id: Snowflake) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        guard.ensure_browsing()?;
        let status = self.registry().status(match_id)?;
        if status != MatchStatus::Chatting {
            return Err(ServiceError::conflict(format!(
                "match {match_id} is {status}, chat is locked"
            )));
        }
        guard.activate_chat(match_id, &self.inner.ctx);
        Ok(())
    }

    /// Close the open conversation; replies still in flight are dropped
    ///
    /// The call's own conversation stays open until the call screen is left.
    pub fn close_chat(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let Some(match_id) = guard.active_chat else {
            return Ok(());
        };
        if guard
            .screen
            .session()
            .is_some_and(|session| session.match_id() == match_id)
        {
            return Err(ServiceError::conflict(
                "the call's chat closes when the call screen is left",
            ));
        }
        guard.active_chat = None;
        guard.teardown_thread(match_id);
        Ok(())
    }

    pub fn active_chat(&self) -> Option<Snowflake> {
        self.inner.state.lock().active_chat
    }

    /// Send a message in the open conversation
    ///
    /// Blank text is ignored. Without an explicit `reply_to` the selected
    /// reply target (if any) is used.
    pub fn send_message(
        &self,
        text: &str,
        reply_to: Option<Snowflake>,
    ) -> ServiceResult<Option<Message>> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        let (match_id, thread) = state.active_thread()?;
        let Some((message, pending)) = thread.send(text, reply_to)? else {
            return Ok(None);
        };

        let ctx = &self.inner.ctx;
        ctx.registry()
            .record_message(match_id, &message.text, message.created_at)?;
        self.inner.publish_message(match_id, &message);

        let me = self.inner.me.clone();
        let ticket = pending.ticket;
        let timer = self
            .inner
            .scheduler
            .after(ctx.config().peer_reply_delay, move || {
                if let Some(inner) = me.upgrade() {
                    inner.on_peer_reply(match_id, ticket);
                }
            });
        state.reply_timers.insert((match_id, ticket), timer);
        Ok(Some(message))
    }

    /// Toggle our reaction on a message; true when added
    pub fn react(&self, message_id: Snowflake, kind: ReactionKind) -> ServiceResult<bool> {
        let mut guard = self.inner.state.lock();
        let (match_id, thread) = guard.active_thread()?;
        let added = thread.react(message_id, kind)?;
        self.inner
            .ctx
            .publish(DomainEvent::ReactionToggled(ReactionToggledEvent {
                match_id,
                message_id,
                kind,
                author: Sender::Me,
                added,
                timestamp: chrono::Utc::now(),
            }));
        Ok(added)
    }

    pub fn reply_to(&self, message_id: Snowflake) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let (_, thread) = guard.active_thread()?;
        Ok(thread.reply(message_id)?)
    }

    pub fn cancel_reply(&self) -> ServiceResult<()> {
        let mut guard = self.inner.state.lock();
        let (_, thread) = guard.active_thread()?;
        thread.cancel_reply();
        Ok(())
    }

    pub fn reply_target(&self) -> Option<Snowflake> {
        let mut guard = self.inner.state.lock();
        guard
            .active_thread()
            .ok()
            .and_then(|(_, thread)| thread.reply_target())
    }

    /// Messages of the open conversation, oldest first
    pub fn messages(&self) -> Vec<Message> {
        let mut guard = self.inner.state.lock();
        guard
            .active_thread()
            .map(|(_, thread)| thread.messages().to_vec())
            .unwrap_or_default()
    }

    /// Messages of any conversation held for `match_id`
    pub fn thread_messages(&self, match_id: Snowflake) -> Vec<Message> {
        self.inner
            .state
            .lock()
            .threads
            .get(&match_id)
            .map(|thread| thread.messages().to_vec())
            .unwrap_or_default()
    }

    /// What a reply message quotes; `None` when it is not a reply
    pub fn reply_preview(&self, message_id: Snowflake) -> ServiceResult<Option<ReplyPreview>> {
        let mut guard = self.inner.state.lock();
        let (_, thread) = guard.active_thread()?;
        let message = thread
            .get(message_id)
            .ok_or(DomainError::MessageNotFound(message_id))?;
        Ok(thread.resolve_reply(message))
    }

    pub fn reaction_counts(&self, message_id: Snowflake) -> ServiceResult<Vec<ReactionCount>> {
        let mut guard = self.inner.state.lock();
        let (_, thread) = guard.active_thread()?;
        Ok(thread.reaction_counts(message_id)?)
    }
}

impl std::fmt::Debug for MatchLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("MatchLifecycle")
            .field("screen", &state.screen.kind())
            .field("deck", &state.deck)
            .field("active_chat", &state.active_chat)
            .finish()
    }
}

impl Inner {
    fn match_name(&self, match_id: Snowflake) -> String {
        self.ctx
            .registry()
            .get(match_id)
            .map_or_else(|| "your match".to_string(), |m| m.name)
    }

    fn decide(
        &self,
        state: &mut LifecycleState,
        decision: SwipeDecision,
    ) -> ServiceResult<Evaluation> {
        state.ensure_browsing()?;
        let evaluation = match state
            .engine
            .evaluate(decision, &mut state.deck, self.ctx.registry())
        {
            Ok(evaluation) => evaluation,
            Err(e) => {
                if matches!(e, DomainError::DeckExhausted) {
                    self.schedule_replenish(state);
                }
                return Err(e.into());
            }
        };

        if evaluation.deck_exhausted {
            self.schedule_replenish(state);
        }

        if let Some(matched) = &evaluation.matched {
            info!(match_id = %matched.id, name = %matched.name, "It's a match");
            self.begin_countdown(state, matched.id)?;
        }
        Ok(evaluation)
    }

    /// Refill the deck after the replenish delay; one refill at a time
    fn schedule_replenish(&self, state: &mut LifecycleState) {
        if state.replenish_timer.is_some() {
            return;
        }
        self.ctx
            .publish(DomainEvent::DeckExhausted(DeckEvent::now()));
        let me = self.me.clone();
        state.replenish_timer = Some(self.scheduler.after(
            self.ctx.config().replenish_delay,
            move || {
                if let Some(inner) = me.upgrade() {
                    inner.on_replenish();
                }
            },
        ));
    }

    fn begin_countdown(&self, state: &mut LifecycleState, match_id: Snowflake) -> ServiceResult<()> {
        let config = self.ctx.config();
        let mut countdown = MatchCountdown::new(config.urgent_secs);
        countdown.start(config.countdown_secs, Instant::now())?;

        let epoch = state.bump_epoch();
        let me = self.me.clone();
        let ticker = self.scheduler.every(TICK, move |now| {
            me.upgrade()
                .map_or(TimerControl::Stop, |inner| inner.on_countdown_tick(epoch, now))
        });
        state.gesture.reset();
        state.screen = Screen::MatchPending {
            match_id,
            countdown,
            epoch,
            _ticker: ticker,
        };

        debug!(match_id = %match_id, limit = config.countdown_secs, "Countdown started");
        self.ctx.publish(DomainEvent::CountdownStarted(CountdownEvent::new(
            match_id,
            config.countdown_secs,
        )));
        Ok(())
    }

    fn on_countdown_tick(&self, epoch: u64, now: Instant) -> TimerControl {
        let mut guard = self.state.lock();
        let (match_id, outcome) = match &mut guard.screen {
            Screen::MatchPending {
                match_id,
                countdown,
                epoch: current,
                ..
            } if *current == epoch => (*match_id, countdown.tick(now)),
            _ => return TimerControl::Stop,
        };

        match outcome {
            TickOutcome::Remaining(remaining) => {
                trace!(match_id = %match_id, remaining, "Countdown tick");
                TimerControl::Continue
            }
            TickOutcome::Inactive => TimerControl::Stop,
            TickOutcome::Expired => {
                guard.screen = Screen::Browsing;
                if let Err(e) = self
                    .ctx
                    .registry()
                    .transition(match_id, MatchTransition::CountdownExpired)
                {
                    error!(match_id = %match_id, error = %e, "Could not expire match");
                    return TimerControl::Stop;
                }
                self.ctx.publish(DomainEvent::CountdownExpired(CountdownEvent::new(
                    match_id, 0,
                )));
                info!(match_id = %match_id, "Match expired");
                let name = self.match_name(match_id);
                self.ctx.notify(
                    NotificationKind::Error,
                    "Match expired!",
                    &format!("You didn't start a call with {name} in time."),
                );
                TimerControl::Stop
            }
        }
    }

    fn on_call_tick(&self, epoch: u64, now: Instant) -> TimerControl {
        let mut guard = self.state.lock();
        match &mut guard.screen {
            Screen::InCall {
                session,
                epoch: current,
                ..
            } if *current == epoch => match session.tick(now) {
                Some(elapsed) => {
                    trace!(match_id = %session.match_id(), elapsed, "Call tick");
                    TimerControl::Continue
                }
                None => TimerControl::Stop,
            },
            _ => TimerControl::Stop,
        }
    }

    fn on_chat_request_answer(&self, match_id: Snowflake, epoch: u64) {
        let mut guard = self.state.lock();
        let Some(matched) = self.ctx.registry().get(match_id) else {
            return;
        };
        let decision = self.ctx.chat_request_strategy().decide(&matched);
        let Some(session) = guard.session_for(match_id) else {
            debug!(match_id = %match_id, "Chat request answer arrived after the call screen closed");
            return;
        };
        let Some(answer) = session.peer_answered(epoch, decision) else {
            debug!(match_id = %match_id, epoch, "Stale chat request answer ignored");
            return;
        };
        guard.answer_timer = None;

        if answer.is_accepted() {
            if let Err(e) = self.chat_accepted(match_id) {
                warn!(match_id = %match_id, error = %e, "Could not unlock chat");
            }
        } else {
            self.publish_chat_request(match_id, answer);
            self.ctx.notify(
                NotificationKind::Info,
                "Chat request declined",
                &format!("{} isn't ready to keep chatting.", matched.name),
            );
        }
    }

    fn chat_accepted(&self, match_id: Snowflake) -> ServiceResult<()> {
        self.publish_chat_request(match_id, ChatRequestState::Accepted);
        self.ctx
            .registry()
            .transition(match_id, MatchTransition::ChatAccepted)?;
        info!(match_id = %match_id, "Chat unlocked");
        let name = self.match_name(match_id);
        self.ctx.notify(
            NotificationKind::Info,
            "Chat unlocked",
            &format!("You and {name} can keep chatting."),
        );
        Ok(())
    }

    fn on_peer_reply(&self, match_id: Snowflake, ticket: u64) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.reply_timers.remove(&(match_id, ticket));
        let Some(thread) = state.threads.get_mut(&match_id) else {
            return;
        };
        let Some(reply) = thread.deliver_peer_reply(ticket, self.ctx.reply_strategy()) else {
            return;
        };

        if let Err(e) = self
            .ctx
            .registry()
            .record_message(match_id, &reply.text, reply.created_at)
        {
            warn!(match_id = %match_id, error = %e, "Could not record last message");
        }
        self.publish_message(match_id, &reply);
    }

    fn on_replenish(&self) {
        let mut guard = self.state.lock();
        guard.replenish_timer = None;
        guard.deck.replenish();
        info!("Profile deck replenished");
        self.ctx
            .publish(DomainEvent::DeckReplenished(DeckEvent::now()));
        self.ctx.notify(
            NotificationKind::Info,
            "That's all for now!",
            "Check back later for more matches.",
        );
    }

    fn publish_chat_request(&self, match_id: Snowflake, state: ChatRequestState) {
        self.ctx
            .publish(DomainEvent::ChatRequestChanged(ChatRequestChangedEvent::new(
                match_id, state,
            )));
    }

    fn publish_message(&self, match_id: Snowflake, message: &Message) {
        self.ctx
            .publish(DomainEvent::MessageAppended(MessageAppendedEvent {
                match_id,
                message_id: message.id,
                sender: message.sender,
                reply_to: message.reply_to(),
                timestamp: message.created_at,
            }));
    }
}
