//! Program guide module
//!
//! Lookups over the decoded schedule and time formatting helpers.

mod schedule;

pub use schedule::GuideSchedule;

use chrono::{DateTime, Local, Utc};

/// Format a timestamp as local time HH:MM
pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

/// Format a timestamp as local datetime YYYY-MM-DD HH:MM
pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
