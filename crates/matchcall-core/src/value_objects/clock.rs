//! Clock and age formatting shared by the countdown, call timer and match list

use chrono::{DateTime, Utc};

/// Format whole seconds as `M:SS`
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Coarse age of a timestamp: `"{n}m ago"`, `"{n}h ago"` or `"{n}d ago"`
pub fn relative_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 60 * 24 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / (60 * 24))
    }
}
