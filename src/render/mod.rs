//! Pure renderers from `ViewState` to HTML and terminal text.
//!
//! DESIGN
//! ======
//! Renderers never touch the network, the clock or the store lock: they take
//! a `&ViewState` and return a `String`. The same state renders to the same
//! bytes, so re-rendering on every store revision is always safe. Services
//! are kept in an ordered map and every interpolated string is escaped.

pub mod sections;
pub mod text;

use std::fmt::Write;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::state::ViewState;

/// Characters kept from chunk text before the ellipsis.
pub const PREVIEW_CHARS: usize = 200;

/// Full HTML document that re-requests itself every `refresh_secs`.
#[must_use]
pub fn render_page(state: &ViewState, refresh_secs: u64) -> String {
    let mut out = String::with_capacity(8 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    if refresh_secs > 0 {
        let _ = writeln!(out, "<meta http-equiv=\"refresh\" content=\"{refresh_secs}\">");
    }
    out.push_str("<title>RAG Dashboard</title>\n</head>\n<body>\n");
    out.push_str(&render_dashboard(state));
    out.push_str("</body>\n</html>\n");
    out
}

/// Dashboard body without the document wrapper.
#[must_use]
pub fn render_dashboard(state: &ViewState) -> String {
    let parts = [
        sections::header(&state.health),
        sections::health_section(&state.health),
        sections::notifications_section(&state.notifications),
        sections::upload_section(&state.uploads),
        sections::documents_section(&state.documents),
        sections::collections_section(&state.collections),
        sections::collection_detail_section(&state.collection_detail),
        sections::search_section(&state.search),
        sections::chat_section(&state.chat),
    ];
    parts.concat()
}

// =============================================================================
// FORMATTING HELPERS
// =============================================================================

/// Escape text for HTML element content and quoted attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// First `max` characters of `text`, with `...` only when something was cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Human-readable size in base-1024 units, at most two decimals.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Render a backend timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Accepts RFC 3339 or a naive ISO-8601 datetime (taken as UTC). Anything
/// else is returned unchanged.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw).map_or_else(|| raw.to_owned(), format_utc)
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    let without_fraction = raw.split_once('.').map_or(raw, |(head, _)| head);
    let naive = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(without_fraction, naive)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn format_utc(at: OffsetDateTime) -> String {
    let layout = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    at.to_offset(UtcOffset::UTC)
        .format(layout)
        .map_or_else(|_| at.to_string(), |s| format!("{s} UTC"))
}

/// `HH:MM:SS` in UTC, used for chat bubbles.
#[must_use]
pub fn format_clock(at: OffsetDateTime) -> String {
    let layout = format_description!("[hour]:[minute]:[second]");
    at.to_offset(UtcOffset::UTC)
        .format(layout)
        .unwrap_or_default()
}

/// Score to three decimals, `N/A` when unknown.
#[must_use]
pub fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "N/A".to_owned(), |s| format!("{s:.3}"))
}
