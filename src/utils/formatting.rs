//! Formatting utilities used for CLI and export outputs.

use chrono::{DateTime, Local, TimeDelta, Utc};

/// `42 m` below a kilometer, `1.27 km` above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Elapsed time as `02h 05m` (or `05m 12s` under an hour).
pub fn format_elapsed(delta: TimeDelta) -> String {
    let secs = delta.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{:02}h {:02}m", hours, minutes)
    } else {
        format!("{:02}m {:02}s", minutes, seconds)
    }
}

/// Local wall-clock rendering of a stored UTC timestamp.
pub fn format_local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
