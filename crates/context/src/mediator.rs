//! The per-session orchestrator.
//!
//! [`ContextMediator`] owns one [`SessionState`] and a clock. Each entry
//! point runs a [`TurnPipeline`] transition against the current state and
//! replaces it only once the transition has returned, so the session never
//! holds a half-applied turn.
//!
//! Calls must be serialized per session: `begin_turn` for the next turn
//! belongs after `update_after_llm` for the current one. The mediator is
//! `Send` and can be moved to whatever task owns the session.

use crate::analysis::BackendSignal;
use crate::pipeline::{ContextBundle, SessionState, TurnPipeline};
use std::sync::Arc;
use toron_config::AppConfig;
use toron_core::{Clock, SystemClock};
use tracing::info;

pub struct ContextMediator {
    pipeline: TurnPipeline,
    session: SessionState,
    clock: Arc<dyn Clock>,
}

impl ContextMediator {
    /// A mediator reading the system clock.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let pipeline = TurnPipeline::from_config(config);
        let session = pipeline.fresh_session();
        Self {
            pipeline,
            session,
            clock,
        }
    }

    /// Process a raw user utterance.
    pub fn begin_turn(&mut self, raw: &str) -> ContextBundle {
        let now = self.clock.now();
        let (next, bundle) = self.pipeline.begin_turn(&self.session, raw, now);
        self.session = next;
        bundle
    }

    /// Record the model's raw reply.
    pub fn update_after_llm(&mut self, raw: &str) -> ContextBundle {
        self.update_after_llm_with(raw, BackendSignal::default())
    }

    /// Record the model's raw reply along with transport metadata.
    pub fn update_after_llm_with(&mut self, raw: &str, signal: BackendSignal) -> ContextBundle {
        let now = self.clock.now();
        let (next, bundle) = self.pipeline.complete_turn(&self.session, raw, signal, now);
        self.session = next;
        bundle
    }

    /// The backend failed before any reply arrived.
    pub fn report_backend_error(&mut self) -> ContextBundle {
        let now = self.clock.now();
        let (next, bundle) = self.pipeline.backend_error(&self.session, now);
        self.session = next;
        bundle
    }

    /// Attenuate the trace for the time elapsed since its last update.
    pub fn decay(&mut self) -> ContextBundle {
        let now = self.clock.now();
        let (next, bundle) = self.pipeline.decay(&self.session, now);
        self.session = next;
        bundle
    }

    /// Start a new conversation. Every field returns to its default at once.
    pub fn reset_context(&mut self) {
        self.session = self.pipeline.fresh_session();
        info!("Context reset");
    }

    /// The current bundle. Does not mutate anything.
    pub fn get_context_metadata(&self) -> ContextBundle {
        self.session.bundle()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }
}

impl Default for ContextMediator {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl std::fmt::Debug for ContextMediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextMediator")
            .field("window_size", &self.session.window.len())
            .field("state", &self.session.state)
            .finish_non_exhaustive()
    }
}
