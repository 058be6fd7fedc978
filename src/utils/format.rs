//! Display formatting for countdowns and durations

/// `M:SS`, e.g. `3:00` or `0:09`
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// `Hh Mm Ss` with the hours omitted below one hour, e.g. `1h 5m 0s` or `12m 30s`
pub fn format_long_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}
