//! Privacy scrubbing.
//!
//! Nothing the pipeline stores may contain raw contact details. Before any
//! text reaches the trace or the context window it passes through here:
//!
//! - email-like substrings become `[redacted]`
//! - digit runs of three or more become `[num]`
//! - whitespace is collapsed and the result is cut to a character limit
//!
//! Redaction always runs before truncation, so a cut can never expose a
//! partial email or number.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Replacement for email-like substrings.
pub const EMAIL_TOKEN: &str = "[redacted]";

/// Replacement for long digit runs.
pub const NUMBER_TOKEN: &str = "[num]";

/// Shortest digit run that is scrubbed.
pub const MIN_DIGIT_RUN: usize = 3;

/// Character limit for window entry summaries.
pub const SUMMARY_LIMIT: usize = 280;

/// Character limit for trace text fields.
pub const FIELD_LIMIT: usize = 120;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+")
        .expect("email pattern is valid")
});

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{3,}").expect("digit-run pattern is valid"));

/// Replace emails and long digit runs. Casing and spacing are preserved.
pub fn redact(text: &str) -> String {
    let without_emails = EMAIL.replace_all(text, EMAIL_TOKEN);
    DIGIT_RUN
        .replace_all(&without_emails, NUMBER_TOKEN)
        .into_owned()
}

/// Scrub text for a window entry summary: redact, collapse whitespace,
/// cut to `max_chars`.
pub fn summarize(text: &str, max_chars: usize) -> String {
    truncate_chars(&collapse_whitespace(&redact(text)), max_chars)
}

/// Scrub text for a trace field: redact, lower-case, collapse whitespace,
/// cut to `max_chars`.
pub fn scrub_field(text: &str, max_chars: usize) -> String {
    truncate_chars(&collapse_whitespace(&redact(text)).to_lowercase(), max_chars)
}

/// Cut to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
