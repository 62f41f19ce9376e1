//! crates/postcraft_core/src/format.rs
//!
//! Human-facing renderings of date keys for calendar cells.
//!
//! Keys are decomposed into year, month and day and formatted as a plain date,
//! never parsed as an instant. Bad input renders as [`INVALID_DATE`].

use crate::schedule::parse_date_key;

pub const INVALID_DATE: &str = "Invalid Date";

fn render(date: &str, pattern: &str) -> String {
    match parse_date_key(date) {
        Ok(date) => date.format(pattern).to_string(),
        Err(_) => INVALID_DATE.to_string(),
    }
}

/// Full weekday name, e.g. `"Monday"`.
pub fn day_name(date: &str) -> String {
    render(date, "%A")
}

/// Short label, e.g. `"Mon, Jan 15"`.
pub fn short_display(date: &str) -> String {
    render(date, "%a, %b %-d")
}
