//! Deterministic cleanup of raw page text before prompting.
//!
//! The rules run in a fixed order, each on the output of the previous one.
//! Cleaning is infallible and idempotent on its own output.

use once_cell::sync::Lazy;
use regex::Regex;

static PAGE_ARTIFACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Page\s+\d+\s+of\s+\d+").unwrap());

static HEADER_FOOTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(Header|Footer):\s*.*\n").unwrap());

static LINE_WRAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());

static REFERENCES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)References").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean raw page text for extraction.
///
/// 1. Strip `Page <n> of <m>` artifacts.
/// 2. Strip `Header:`/`Footer:` lines (case-insensitive) with their newline.
/// 3. Collapse whitespace runs spanning a newline into a single space.
/// 4. Truncate at the first case-insensitive `References` — everything from
///    the match onward is bibliography noise and gets dropped. Text without
///    a references section is kept in full.
/// 5. Collapse remaining whitespace runs to single spaces and trim.
pub fn clean_text(raw: &str) -> String {
    let text = PAGE_ARTIFACT_RE.replace_all(raw, "");
    let text = HEADER_FOOTER_RE.replace_all(&text, "");
    let text = LINE_WRAP_RE.replace_all(&text, " ");
    let text: &str = text.as_ref();
    let body = match REFERENCES_RE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };
    WHITESPACE_RE.replace_all(body, " ").trim().to_string()
}

/// Truncate to at most `max` characters without splitting a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
