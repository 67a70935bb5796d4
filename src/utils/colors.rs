/// ANSI color helper utilities for terminal output.
use crate::models::user::AttendanceStatus;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Green when checked in, grey when checked out.
pub fn color_for_status(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::CheckedIn => GREEN,
        AttendanceStatus::CheckedOut => GREY,
    }
}

pub fn colorize_status(status: AttendanceStatus) -> String {
    format!("{}{}{}", color_for_status(status), status.as_str(), RESET)
}

/// Green inside the fence, red outside.
pub fn colorize_fence(text: &str, within: bool) -> String {
    if within {
        format!("{GREEN}{text}{RESET}")
    } else {
        format!("{RED}{text}{RESET}")
    }
}

/// Grey placeholder for empty values.
pub fn colorize_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => format!("{GREY}--{RESET}"),
    }
}
