//! Test fixtures and scripted collaborators
//!
//! Provides reusable profiles and port implementations whose behavior the
//! tests control.

use matchcall_core::{DrawSource, NotificationKind, NotificationSink, Profile};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A profile with two images and a unique id
pub fn profile(name: &str) -> Profile {
    let suffix = unique_suffix();
    Profile::new(format!("p{suffix}"), name, 29)
        .with_bio(format!("{name} likes long walks"))
        .with_images([format!("{name}-{suffix}-1.jpg"), format!("{name}-{suffix}-2.jpg")])
        .with_interests(["Coffee", "Hiking"])
}

/// A deck of `names.len()` profiles
pub fn profiles(names: &[&str]) -> Vec<Profile> {
    names.iter().map(|name| profile(name)).collect()
}

/// Draws replayed in order; 0.0 (never a match) once the script runs out
#[derive(Debug, Default)]
pub struct ScriptedDraws {
    script: VecDeque<f64>,
}

impl ScriptedDraws {
    pub fn new(script: &[f64]) -> Self {
        Self {
            script: script.iter().copied().collect(),
        }
    }

    /// Every draw is a match
    pub fn always_match(count: usize) -> Self {
        Self::new(&vec![0.99; count])
    }
}

impl DrawSource for ScriptedDraws {
    fn draw(&mut self) -> f64 {
        self.script.pop_front().unwrap_or(0.0)
    }
}

/// A notification as the user would have seen it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

/// Records every notification
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn titled(&self, title: &str) -> Vec<Notification> {
        self.seen
            .lock()
            .iter()
            .filter(|n| n.title == title)
            .cloned()
            .collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, body: &str) {
        self.seen.lock().push(Notification {
            kind,
            title: title.to_string(),
            body: body.to_string(),
        });
    }
}
