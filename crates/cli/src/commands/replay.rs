//! `toron replay`: Feed a transcript through a single session.
//!
//! The session runs on a manual clock that starts at the current time and
//! only moves on `!decay`, so a replay is reproducible apart from the
//! starting timestamp.

use crate::transcript::{self, Action};
use chrono::Duration;
use std::path::Path;
use std::sync::Arc;
use toron_config::AppConfig;
use toron_context::{ContextBundle, ContextMediator};
use toron_core::{Clock, ManualClock, Result, SystemClock};
use tracing::info;

pub fn run(config: &AppConfig, path: &Path, pretty: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let actions = transcript::parse(&content)?;
    info!(actions = actions.len(), "Replaying transcript");

    let clock = Arc::new(ManualClock::new(SystemClock.now()));
    for bundle in replay(config, clock, &actions) {
        super::emit(&bundle, pretty)?;
    }
    Ok(())
}

/// Apply every action to a fresh session, collecting one bundle per action.
pub fn replay(
    config: &AppConfig,
    clock: Arc<ManualClock>,
    actions: &[Action],
) -> Vec<ContextBundle> {
    let mut mediator = ContextMediator::with_clock(config, clock.clone());

    actions
        .iter()
        .map(|action| match action {
            Action::User(text) => mediator.begin_turn(text),
            Action::Assistant(text) => mediator.update_after_llm(text),
            Action::BackendError => mediator.report_backend_error(),
            Action::Decay(secs) => {
                clock.advance(Duration::seconds(i64::from(*secs)));
                mediator.decay()
            }
            Action::Reset => {
                mediator.reset_context();
                mediator.get_context_metadata()
            }
        })
        .collect()
}
