//! Shared utility functions

use chrono::{DateTime, Utc};

/// Format how long ago a timestamp was (e.g., "42s ago", "5m ago", "3d ago")
pub fn format_age(at: DateTime<Utc>) -> String {
    format_age_secs(Utc::now().signed_duration_since(at).num_seconds())
}

fn format_age_secs(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86400)
    }
}
