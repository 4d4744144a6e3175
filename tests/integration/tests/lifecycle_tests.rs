//! Lifecycle Integration Tests
//!
//! End-to-end journeys through swipe, countdown, call and chat on a paused
//! tokio clock. No external services are needed.
//!
//! Run with: cargo test -p integration-tests --test lifecycle_tests

use std::time::Duration;

use integration_tests::{is_valid_status_path, TestHarness};
use matchcall_common::{ChatRequestPolicy, LifecycleConfig};
use matchcall_core::{
    ChatRequestDecision, ChatRequestState, DomainEvent, MatchStatus, NotificationKind,
    ReactionKind, Sender,
};
use matchcall_service::services::{GestureOutcome, MatchFilter, ScreenKind, SwipeDecision};

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn count(events: &[DomainEvent], event_type: &str) -> usize {
    events
        .iter()
        .filter(|e| e.event_type() == event_type)
        .count()
}

// ============================================================================
// Swipe -> Match -> Call
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_swipe_match_then_start_call() {
    let h = TestHarness::start(&[0.7]).unwrap();
    let lc = &h.lifecycle;

    lc.press(40.0);
    lc.drag_to(160.0);
    assert_eq!(
        lc.release().unwrap(),
        Some(GestureOutcome::Swipe(SwipeDecision::Accept))
    );

    assert_eq!(lc.screen(), ScreenKind::MatchPending);
    let pending = lc.countdown().unwrap();
    assert_eq!(pending.remaining, 300);
    assert_eq!(pending.name, "Olivia");
    let match_id = pending.match_id;
    assert_eq!(lc.registry().status(match_id).unwrap(), MatchStatus::Waiting);

    h.advance(secs(20.5)).await;
    assert_eq!(lc.countdown().unwrap().remaining, 280);

    lc.start_call().unwrap();
    assert_eq!(lc.screen(), ScreenKind::InCall);
    assert!(lc.countdown().is_none());
    assert_eq!(
        lc.registry().status(match_id).unwrap(),
        MatchStatus::Completed
    );
    let call = lc.call().unwrap();
    assert_eq!(call.match_id, match_id);
    assert_eq!(call.elapsed, 0);
    assert!(call.active);

    h.advance(secs(65.5)).await;
    assert_eq!(lc.call().unwrap().display, "1:05");
}

#[tokio::test(start_paused = true)]
async fn test_accept_without_mutual_match_moves_on() {
    let h = TestHarness::start(&[0.5]).unwrap();
    let evaluation = h.lifecycle.like().unwrap();

    assert!(evaluation.matched.is_none());
    assert_eq!(evaluation.next_index, 1);
    assert_eq!(h.lifecycle.screen(), ScreenKind::Browsing);
    assert_eq!(h.lifecycle.current_profile().unwrap().name, "Liam");
    assert!(h.lifecycle.registry().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_short_drag_snaps_back() {
    let h = TestHarness::start(&[0.9]).unwrap();
    let lc = &h.lifecycle;

    lc.press(100.0);
    lc.drag_to(190.0);
    assert!((lc.card().offset - 90.0).abs() < 1e-9);
    assert_eq!(
        lc.release().unwrap(),
        Some(GestureOutcome::Swipe(SwipeDecision::None))
    );
    assert!(lc.card().offset.abs() < f64::EPSILON);
    assert_eq!(lc.deck_index(), 0);
    assert_eq!(lc.screen(), ScreenKind::Browsing);
}

// ============================================================================
// Countdown
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_countdown_expiry_notifies_once() {
    let mut h = TestHarness::start(&[0.9]).unwrap();
    let match_id = h.match_next().unwrap();

    h.advance(secs(299.5)).await;
    assert_eq!(h.lifecycle.countdown().unwrap().remaining, 1);
    assert!(h.lifecycle.countdown().unwrap().urgent);

    h.advance(secs(1.0)).await;
    assert_eq!(h.lifecycle.screen(), ScreenKind::Browsing);
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Expired
    );

    let expired = h.notifier.titled("Match expired!");
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].kind, NotificationKind::Error);
    assert_eq!(
        expired[0].body,
        "You didn't start a call with Olivia in time."
    );

    h.advance(secs(600.0)).await;
    let events = h.drain_events();
    assert_eq!(count(&events, "COUNTDOWN_EXPIRED"), 1);
    assert_eq!(h.notifier.titled("Match expired!").len(), 1);
    assert_eq!(
        h.status_history(match_id),
        vec![MatchStatus::Waiting, MatchStatus::Expired]
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_midway_never_expires() {
    let mut h = TestHarness::start(&[0.9]).unwrap();
    let match_id = h.match_next().unwrap();

    h.advance(secs(150.5)).await;
    assert_eq!(h.lifecycle.countdown().unwrap().remaining, 150);
    h.lifecycle.cancel_match().unwrap();

    assert_eq!(h.lifecycle.screen(), ScreenKind::Browsing);
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Expired
    );
    let canceled = h.notifier.titled("Match canceled");
    assert_eq!(canceled.len(), 1);
    assert_eq!(canceled[0].body, "You've canceled the match.");

    h.advance(secs(400.0)).await;
    let events = h.drain_events();
    assert_eq!(count(&events, "COUNTDOWN_EXPIRED"), 0);
    assert_eq!(count(&events, "COUNTDOWN_CANCELLED"), 1);
    assert!(h.notifier.titled("Match expired!").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_expired_match_cannot_be_called() {
    let h = TestHarness::start(&[0.9]).unwrap();
    let match_id = h.match_next().unwrap();
    h.advance(secs(300.5)).await;

    let err = h.lifecycle.open_match(match_id).unwrap_err();
    assert_eq!(err.error_code(), "CONFLICT");
    assert!(h.lifecycle.start_call().is_err());
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Expired
    );
}

#[tokio::test(start_paused = true)]
async fn test_open_match_blocked_while_countdown_runs() {
    let h = TestHarness::start(&[0.9]).unwrap();
    let first = h.match_next().unwrap();
    h.advance(secs(10.5)).await;

    assert_eq!(
        h.lifecycle.open_match(first).unwrap_err().error_code(),
        "MATCH_IN_PROGRESS"
    );
    assert_eq!(h.lifecycle.countdown().unwrap().remaining, 290);
}

// ============================================================================
// Call & Chat
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_chat_during_call_gets_one_reply() {
    let h = TestHarness::start(&[0.9]).unwrap();
    let match_id = h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();

    let sent = h.lifecycle.send_message("hi", None).unwrap().unwrap();
    assert_eq!(sent.sender, Sender::Me);
    assert_eq!(h.lifecycle.messages().len(), 1);

    h.advance(secs(1.9)).await;
    assert_eq!(h.lifecycle.messages().len(), 1);

    h.advance(secs(0.2)).await;
    let messages = h.lifecycle.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].sender, Sender::Peer);

    assert!(h.lifecycle.send_message("", None).unwrap().is_none());
    h.advance(secs(5.0)).await;
    assert_eq!(h.lifecycle.messages().len(), 2);

    let summary = h.lifecycle.registry().get(match_id).unwrap();
    assert_eq!(summary.last_message.unwrap().text, messages[1].text);
}

#[tokio::test(start_paused = true)]
async fn test_reply_survives_end_call_but_not_leaving() {
    let mut h = TestHarness::start(&[0.9]).unwrap();
    let match_id = h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();

    h.lifecycle.send_message("first", None).unwrap();
    h.lifecycle.end_call().unwrap();
    assert_eq!(h.lifecycle.screen(), ScreenKind::PostCall);
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Completed
    );
    h.advance(secs(2.1)).await;
    assert_eq!(h.lifecycle.thread_messages(match_id).len(), 2);

    h.lifecycle.send_message("second", None).unwrap();
    h.lifecycle.leave_call().unwrap();
    h.advance(secs(5.0)).await;
    assert!(h.lifecycle.thread_messages(match_id).is_empty());
    assert_eq!(count(&h.drain_events(), "MESSAGE_APPENDED"), 3);
    assert_eq!(h.lifecycle.screen(), ScreenKind::Browsing);
}

#[tokio::test(start_paused = true)]
async fn test_end_call_notification_and_controls() {
    let h = TestHarness::start(&[0.9]).unwrap();
    h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();

    h.lifecycle.toggle_mute().unwrap();
    h.lifecycle.toggle_video().unwrap();
    h.advance(secs(12.5)).await;
    assert_eq!(h.lifecycle.end_call().unwrap(), 12);

    let ended = h.notifier.titled("Call ended");
    assert_eq!(ended[0].body, "Your call with Olivia has ended.");
    assert!(h.lifecycle.toggle_mute().is_err());
    assert_eq!(
        h.lifecycle.end_call().unwrap_err().error_code(),
        "NO_ACTIVE_CALL"
    );

    h.advance(secs(30.0)).await;
    assert_eq!(h.lifecycle.call().unwrap().elapsed, 12);
}

#[tokio::test(start_paused = true)]
async fn test_reactions_toggle_in_pairs() {
    let h = TestHarness::start(&[0.9]).unwrap();
    h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();
    let message = h.lifecycle.send_message("hello", None).unwrap().unwrap();

    let before = h.lifecycle.reaction_counts(message.id).unwrap();
    assert!(h.lifecycle.react(message.id, ReactionKind::Heart).unwrap());
    assert_eq!(h.lifecycle.reaction_counts(message.id).unwrap()[0].count, 1);
    assert!(!h.lifecycle.react(message.id, ReactionKind::Heart).unwrap());
    assert_eq!(h.lifecycle.reaction_counts(message.id).unwrap(), before);
}

#[tokio::test(start_paused = true)]
async fn test_reply_quotes_earlier_message() {
    let h = TestHarness::start(&[0.9]).unwrap();
    h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();
    h.lifecycle.send_message("Where should we meet?", None).unwrap();
    h.advance(secs(2.5)).await;

    let peer = h.lifecycle.messages()[1].clone();
    h.lifecycle.reply_to(peer.id).unwrap();
    assert_eq!(h.lifecycle.reply_target(), Some(peer.id));

    let answer = h.lifecycle.send_message("Same here!", None).unwrap().unwrap();
    assert_eq!(answer.reply_to(), Some(peer.id));
    assert_eq!(h.lifecycle.reply_target(), None);

    let preview = h.lifecycle.reply_preview(answer.id).unwrap().unwrap();
    assert!(!preview.is_missing());
    assert_eq!(preview.text(), peer.text);
}

// ============================================================================
// Chat request & status graph
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_chat_request_accepted_after_call() {
    let mut h = TestHarness::start(&[0.9]).unwrap();
    let match_id = h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();

    // the default policy only allows asking once the call is over
    assert_eq!(
        h.lifecycle.request_chat().unwrap_err().error_code(),
        "CHAT_REQUEST_UNAVAILABLE"
    );
    h.lifecycle.end_call().unwrap();
    h.lifecycle.request_chat().unwrap();
    assert_eq!(
        h.lifecycle.call().unwrap().chat_request,
        ChatRequestState::RequestedByMe
    );

    h.advance(secs(2.1)).await;
    assert_eq!(
        h.lifecycle.call().unwrap().chat_request,
        ChatRequestState::Accepted
    );
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Chatting
    );
    assert_eq!(
        h.notifier.titled("Chat unlocked")[0].body,
        "You and Olivia can keep chatting."
    );

    let path = h.status_history(match_id);
    assert_eq!(
        path,
        vec![
            MatchStatus::Waiting,
            MatchStatus::Completed,
            MatchStatus::Chatting
        ]
    );
    assert!(is_valid_status_path(&path));

    let changes: Vec<(MatchStatus, MatchStatus)> = h
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            DomainEvent::MatchStatusChanged(c) => Some((c.from, c.to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (MatchStatus::Waiting, MatchStatus::Completed),
            (MatchStatus::Completed, MatchStatus::Chatting)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_chat_request_declined() {
    let h = TestHarness::builder()
        .draws(&[0.9])
        .peer_decision(ChatRequestDecision::Decline)
        .build()
        .unwrap();
    let match_id = h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();
    h.lifecycle.end_call().unwrap();
    h.lifecycle.request_chat().unwrap();

    h.advance(secs(2.1)).await;
    assert_eq!(
        h.lifecycle.call().unwrap().chat_request,
        ChatRequestState::None
    );
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Completed
    );
    assert_eq!(
        h.notifier.titled("Chat request declined")[0].body,
        "Olivia isn't ready to keep chatting."
    );
}

#[tokio::test(start_paused = true)]
async fn test_withdrawn_request_is_never_answered() {
    let h = TestHarness::start(&[0.9]).unwrap();
    let match_id = h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();
    h.lifecycle.end_call().unwrap();

    h.lifecycle.request_chat().unwrap();
    h.advance(secs(1.0)).await;
    h.lifecycle.withdraw_chat_request().unwrap();
    h.advance(secs(5.0)).await;

    assert_eq!(
        h.lifecycle.call().unwrap().chat_request,
        ChatRequestState::None
    );
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Completed
    );
    assert!(h.notifier.titled("Chat unlocked").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_during_call_policy() {
    let config = LifecycleConfig {
        chat_request_policy: ChatRequestPolicy::DuringCall {
            min_elapsed_secs: 30,
        },
        ..LifecycleConfig::default()
    };
    let h = TestHarness::builder()
        .config(config)
        .draws(&[0.9])
        .build()
        .unwrap();
    let match_id = h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();

    h.advance(secs(10.5)).await;
    assert!(h.lifecycle.request_chat().is_err());

    h.advance(secs(20.0)).await;
    h.lifecycle.request_chat().unwrap();
    h.advance(secs(2.1)).await;

    assert_eq!(h.lifecycle.screen(), ScreenKind::InCall);
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Chatting
    );
    h.lifecycle.end_call().unwrap();
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Chatting
    );
}

#[tokio::test(start_paused = true)]
async fn test_peer_initiated_request() {
    let h = TestHarness::start(&[0.9]).unwrap();
    let match_id = h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();
    h.lifecycle.end_call().unwrap();

    h.lifecycle.receive_chat_request().unwrap();
    assert_eq!(
        h.lifecycle.call().unwrap().chat_request,
        ChatRequestState::Received
    );
    assert!(h.lifecycle.withdraw_chat_request().is_err());

    h.lifecycle.accept_chat_request().unwrap();
    assert_eq!(
        h.lifecycle.registry().status(match_id).unwrap(),
        MatchStatus::Chatting
    );
}

#[tokio::test(start_paused = true)]
async fn test_chat_reopens_from_matches_list() {
    let h = TestHarness::start(&[0.9]).unwrap();
    let match_id = h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();
    h.lifecycle.end_call().unwrap();
    h.lifecycle.receive_chat_request().unwrap();
    h.lifecycle.accept_chat_request().unwrap();
    h.lifecycle.leave_call().unwrap();

    assert!(h.lifecycle.active_chat().is_none());
    h.lifecycle.open_chat(match_id).unwrap();
    h.lifecycle.send_message("Picking up where we left off", None).unwrap();
    h.advance(secs(2.1)).await;
    assert_eq!(h.lifecycle.messages().len(), 2);

    h.lifecycle.close_chat().unwrap();
    assert!(h.lifecycle.messages().is_empty());
    assert_eq!(h.lifecycle.thread_messages(match_id).len(), 2);
}

// ============================================================================
// Deck & list
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_deck_exhaustion_replenishes() {
    let h = TestHarness::start(&[]).unwrap();
    for _ in 0..2 {
        assert!(!h.lifecycle.pass().unwrap().deck_exhausted);
    }
    assert!(h.lifecycle.pass().unwrap().deck_exhausted);
    assert!(h.lifecycle.current_profile().is_none());
    assert_eq!(
        h.lifecycle.like().unwrap_err().error_code(),
        "DECK_EXHAUSTED"
    );

    h.advance(secs(0.6)).await;
    assert_eq!(h.lifecycle.deck_index(), 0);
    assert_eq!(h.lifecycle.current_profile().unwrap().name, "Olivia");
    let notice = h.notifier.titled("That's all for now!");
    assert_eq!(notice.len(), 1);
    assert_eq!(notice[0].body, "Check back later for more matches.");
}

#[tokio::test(start_paused = true)]
async fn test_matches_list_tabs() {
    let h = TestHarness::start(&[0.9, 0.9, 0.9]).unwrap();

    let expired = h.match_next().unwrap();
    h.lifecycle.cancel_match().unwrap();

    let completed = h.match_next().unwrap();
    h.lifecycle.start_call().unwrap();
    h.lifecycle.end_call().unwrap();
    h.lifecycle.leave_call().unwrap();

    let waiting = h.match_next().unwrap();

    let all = h.lifecycle.list_matches(MatchFilter::All);
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, waiting);
    assert_eq!(all[2].id, expired);

    let pending = h.lifecycle.list_matches(MatchFilter::Pending);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, waiting);

    let done = h.lifecycle.list_matches(MatchFilter::Completed);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, completed);

    for m in &all {
        assert!(is_valid_status_path(&h.status_history(m.id)));
    }
}

#[tokio::test(start_paused = true)]
async fn test_events_serialize_for_presentation() {
    let mut h = TestHarness::start(&[0.9]).unwrap();
    h.match_next().unwrap();

    let events = h.drain_events();
    assert_eq!(events[0].event_type(), "MATCH_CREATED");
    let json = serde_json::to_value(events.last().unwrap()).unwrap();
    assert_eq!(json["type"], "COUNTDOWN_STARTED");
    assert_eq!(json["remaining"], 300);
}
