//! Transcript format for `toron replay`.
//!
//! One action per line:
//!
//! ```text
//! # comment
//! user: Can you help me plan the rollout?
//! assistant: Sure, start with a staging wave.
//! !error
//! !decay 90
//! !reset
//! ```
//!
//! Blank lines and `#` comments are skipped. Anything else is an error that
//! names the offending line.

use toron_core::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    User(String),
    Assistant(String),
    /// The backend failed before replying.
    BackendError,
    /// Let this many seconds pass, then decay the trace.
    Decay(u32),
    Reset,
}

pub fn parse(content: &str) -> Result<Vec<Action>> {
    let mut actions = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        actions.push(parse_line(line).map_err(|reason| Error::Transcript {
            line: idx + 1,
            reason,
        })?);
    }

    Ok(actions)
}

fn parse_line(line: &str) -> std::result::Result<Action, String> {
    if let Some(text) = line.strip_prefix("user:") {
        return Ok(Action::User(text.trim().to_string()));
    }
    if let Some(text) = line.strip_prefix("assistant:") {
        return Ok(Action::Assistant(text.trim().to_string()));
    }

    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("!error"), None, _) => Ok(Action::BackendError),
        (Some("!reset"), None, _) => Ok(Action::Reset),
        (Some("!decay"), Some(secs), None) => secs
            .parse()
            .map(Action::Decay)
            .map_err(|_| format!("'!decay' expects whole seconds, got '{secs}'")),
        (Some("!decay"), _, _) => Err("'!decay' takes exactly one argument".into()),
        _ => Err("expected 'user:', 'assistant:', '!error', '!reset' or '!decay <secs>'".into()),
    }
}
