//! Human-readable time formatting

use std::time::Duration;

/// Format whole seconds as "m:ss"
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Format elapsed milliseconds as "m:ss"; negative values read as zero
pub fn format_elapsed(millis: i64) -> String {
    format_clock(millis.max(0) as u64 / 1000)
}

/// Format a duration as "1h 2m 3s", dropping leading zero units
pub fn format_uptime(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    let minutes = (duration.as_secs() % 3600) / 60;
    let seconds = duration.as_secs() % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
