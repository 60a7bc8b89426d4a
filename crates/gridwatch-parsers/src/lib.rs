//! Shared parsing utilities for grid status payloads.
//!
//! The backend is a loosely-typed JSON API; these helpers turn its string
//! fields into typed values without failing the whole payload.

pub mod time;

pub use time::{
    TimestampError, format_duration, format_hours, format_offset_hours, parse_timestamp,
};

/// Filter helper for optional string fields.
/// Returns None if the string is empty or a placeholder value.
pub fn non_empty_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty()
        || trimmed == "-"
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed == "N/A"
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Shorten an identifier for display, keeping the first `max` characters.
pub fn short_id(id: &str, max: usize) -> String {
    if id.chars().count() <= max {
        id.to_string()
    } else {
        let head: String = id.chars().take(max).collect();
        format!("{head}…")
    }
}
