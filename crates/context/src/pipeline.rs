//! The turn pipeline: caller-owned session data plus pure transitions.
//!
//! A [`SessionState`] is plain data. Every transition on [`TurnPipeline`]
//! borrows the previous state and returns a brand new one together with the
//! bundle derived from it, so a caller either commits the whole turn or
//! nothing at all.
//!
//! Stage order for a user turn:
//!
//! 1. Scrub the raw text
//! 2. Classify against the previous trace
//! 3. Select a persona
//! 4. Advance the state machine
//! 5. Build the ambient metadata from the previous state, then report the
//!    advanced activity in it
//! 6. Decay, then update the trace
//! 7. Append the window entry
//! 8. Compile and shape
//!
//! Raw text never leaves step 1. Log lines carry scores and labels only.

use crate::analysis::{
    BackendSignal, IntentClassification, IntentClassifier, PersonaEngine, PersonaProfile,
    StateMachine, ToronState, extract_topic,
};
use crate::history::{
    ContextWindow, ContextWindowEntry, SanitizedTrace, SanitizedTraceSnapshot, TraceUpdate,
};
use crate::shaping::{
    AdaptiveResponseEngine, CompiledContext, ContextCompiler, ContextShaper, ShapedContextMetadata,
    ToronAdaptiveMetadata,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use toron_config::{AppConfig, TraceConfig, WindowConfig};
use toron_core::{Role, sanitize, score};
use tracing::{debug, info};

/// Momentum added by a user turn before urgency.
const USER_MOMENTUM: f64 = 0.15;

/// Momentum added by an assistant reply.
const REPLY_MOMENTUM: f64 = 0.05;

/// Safety weight target after a backend failure.
const FAILURE_SAFETY_TARGET: f64 = 0.9;

/// Everything a session remembers between turns.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub trace: SanitizedTraceSnapshot,
    pub window: ContextWindow,
    pub persona: PersonaProfile,
    pub state: ToronState,
    pub compiled: CompiledContext,
    pub shaped: ShapedContextMetadata,
    pub ambient: ToronAdaptiveMetadata,
    /// The classification behind the current persona and ambient metadata.
    pub last_classification: IntentClassification,
}

impl SessionState {
    /// The bundle describing this state.
    pub fn bundle(&self) -> ContextBundle {
        ContextBundle {
            current_context: self.compiled.clone(),
            metadata_for_visualizer: VisualizerMetadata {
                shaped: self.shaped.clone(),
                trace: self.trace.clone(),
                window_size: self.window.len(),
                semantic_density: self.window.semantic_density_score(),
                ambient: self.ambient.clone(),
            },
            metadata_for_llm: self.shaped.clone(),
            persona: self.persona.clone(),
            state: self.state,
        }
    }
}

/// Full output of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub current_context: CompiledContext,
    pub metadata_for_visualizer: VisualizerMetadata,
    pub metadata_for_llm: ShapedContextMetadata,
    pub persona: PersonaProfile,
    pub state: ToronState,
}

/// What the real-time renderer receives. Everything here is already scrubbed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizerMetadata {
    #[serde(flatten)]
    pub shaped: ShapedContextMetadata,
    pub trace: SanitizedTraceSnapshot,
    pub window_size: usize,
    pub semantic_density: f64,
    pub ambient: ToronAdaptiveMetadata,
}

/// The stateless stages, configured once per session.
#[derive(Debug, Clone, Default)]
pub struct TurnPipeline {
    classifier: IntentClassifier,
    personas: PersonaEngine,
    states: StateMachine,
    compiler: ContextCompiler,
    shaper: ContextShaper,
    adaptive: AdaptiveResponseEngine,
    trace_config: TraceConfig,
    window_config: WindowConfig,
}

impl TurnPipeline {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            classifier: IntentClassifier::new(config.classifier.clone()),
            personas: PersonaEngine::new(config.persona.clone()),
            states: StateMachine::new(config.state.clone()),
            compiler: ContextCompiler::new(),
            shaper: ContextShaper::new(),
            adaptive: AdaptiveResponseEngine::new(),
            trace_config: config.trace.clone(),
            window_config: config.window.clone(),
        }
    }

    /// The documented default state of a new conversation.
    pub fn fresh_session(&self) -> SessionState {
        let trace = SanitizedTraceSnapshot::default();
        let compiled = CompiledContext::default();
        let shaped = self.shaper.shape(&compiled, &trace);
        SessionState {
            trace,
            window: ContextWindow::from_config(&self.window_config),
            persona: PersonaProfile::default(),
            state: ToronState::default(),
            compiled,
            shaped,
            ambient: ToronAdaptiveMetadata::default(),
            last_classification: IntentClassification::default(),
        }
    }

    /// Process one raw user utterance.
    pub fn begin_turn(
        &self,
        session: &SessionState,
        raw: &str,
        now: DateTime<Utc>,
    ) -> (SessionState, ContextBundle) {
        let text = sanitize::summarize(raw, sanitize::SUMMARY_LIMIT);

        let classification = self.classifier.classify(&text, Some(&session.trace));
        let persona = self.personas.derive_persona(&classification);
        let state = self.states.advance(&session.state, &classification, None);
        let mut ambient = self.adaptive.build_adaptive_response(
            &persona,
            &classification,
            &session.state,
            None,
        );

        let mut trace = self.resume_trace(session, now);
        let negative = if classification.emotion.is_negative() { 0.2 } else { 0.0 };
        trace.update(
            TraceUpdate {
                intent: Some(classification.intent.to_string()),
                emotion: Some(classification.emotion.to_string()),
                topic: Some(extract_topic(&text)),
                momentum_boost: Some(USER_MOMENTUM + 0.1 * score::unit(classification.urgency)),
                safety_weight: Some(score::unit(
                    0.3 + 0.3 * classification.urgency
                        + negative
                        + 0.2 * ambient.hallucination_risk,
                )),
                hallucination_adjustment: Some(self.risk_adjustment(&ambient)),
                llm_agreement: Some(ambient.llm_agreement),
            },
            now,
        );
        ambient.hallucination_risk = trace.current().hallucination_risk;

        let mut window = session.window.clone();
        window.add_entry(ContextWindowEntry::new(
            Role::User,
            classification.intent,
            classification.emotion,
            &text,
            now,
        ));

        debug!(
            intent = %classification.intent,
            emotion = %classification.emotion,
            persona = %persona.persona,
            activity = %state.activity,
            phase = %state.phase,
            window_size = window.len(),
            "User turn classified"
        );

        self.commit(window, trace.snapshot(), persona, state, ambient, classification)
    }

    /// Fold the model's reply back in. A failing signal is routed to
    /// [`TurnPipeline::backend_error`] and the reply is not recorded.
    pub fn complete_turn(
        &self,
        session: &SessionState,
        raw: &str,
        signal: BackendSignal,
        now: DateTime<Utc>,
    ) -> (SessionState, ContextBundle) {
        if signal.error {
            return self.backend_error(session, now);
        }

        let text = sanitize::summarize(raw, sanitize::SUMMARY_LIMIT);
        let classification = IntentClassification::respond();
        let persona = session.persona.clone();
        let state = self.states.advance(&session.state, &classification, Some(&signal));
        let mut ambient = self.adaptive.build_adaptive_response(
            &persona,
            &classification,
            &session.state,
            Some(&signal),
        );

        let mut trace = self.resume_trace(session, now);
        trace.update(
            TraceUpdate {
                momentum_boost: Some(REPLY_MOMENTUM),
                hallucination_adjustment: Some(self.risk_adjustment(&ambient)),
                llm_agreement: Some(ambient.llm_agreement),
                ..Default::default()
            },
            now,
        );
        ambient.hallucination_risk = trace.current().hallucination_risk;

        let mut window = session.window.clone();
        window.add_entry(ContextWindowEntry::new(
            Role::Assistant,
            classification.intent,
            classification.emotion,
            &text,
            now,
        ));

        debug!(
            activity = %state.activity,
            phase = %state.phase,
            window_size = window.len(),
            "Assistant reply recorded"
        );

        self.commit(window, trace.snapshot(), persona, state, ambient, classification)
    }

    /// Record a backend failure. The window is untouched; the state moves to
    /// `error` and ambient confidence collapses.
    pub fn backend_error(
        &self,
        session: &SessionState,
        now: DateTime<Utc>,
    ) -> (SessionState, ContextBundle) {
        let failure = BackendSignal::failure();
        let classification = session.last_classification.clone();
        let persona = session.persona.clone();
        let state = self.states.advance(&session.state, &classification, Some(&failure));
        let mut ambient = self.adaptive.build_adaptive_response(
            &persona,
            &classification,
            &session.state,
            Some(&failure),
        );

        let mut trace = self.resume_trace(session, now);
        trace.update(
            TraceUpdate {
                safety_weight: Some(FAILURE_SAFETY_TARGET),
                hallucination_adjustment: Some(self.risk_adjustment(&ambient)),
                llm_agreement: Some(ambient.llm_agreement),
                ..Default::default()
            },
            now,
        );
        ambient.hallucination_risk = trace.current().hallucination_risk;

        info!(
            previous = %session.state.activity,
            confidence = ambient.confidence,
            "Backend failure signalled"
        );

        self.commit(
            session.window.clone(),
            trace.snapshot(),
            persona,
            state,
            ambient,
            classification,
        )
    }

    /// Apply idle decay to the trace and re-shape. Nothing else changes.
    pub fn decay(
        &self,
        session: &SessionState,
        now: DateTime<Utc>,
    ) -> (SessionState, ContextBundle) {
        let trace = self.resume_trace(session, now).snapshot();
        let mut next = session.clone();
        next.shaped = self.shaper.shape(&next.compiled, &trace);
        next.ambient.hallucination_risk = trace.hallucination_risk;
        next.trace = trace;

        debug!(
            momentum = next.trace.conversation_momentum,
            hallucination_risk = next.trace.hallucination_risk,
            "Trace decayed"
        );

        let bundle = next.bundle();
        (next, bundle)
    }

    /// Rehydrate the session trace and bring it up to `now`.
    fn resume_trace(&self, session: &SessionState, now: DateTime<Utc>) -> SanitizedTrace {
        let mut trace = SanitizedTrace::resume(self.trace_config.clone(), session.trace.clone());
        trace.decay(now);
        trace
    }

    /// The increment that moves the trace risk toward the ambient estimate.
    /// At steady state the trace converges on the estimate itself.
    fn risk_adjustment(&self, ambient: &ToronAdaptiveMetadata) -> f64 {
        ambient.hallucination_risk * (1.0 - score::unit(self.trace_config.hallucination_retention))
    }

    fn commit(
        &self,
        window: ContextWindow,
        trace: SanitizedTraceSnapshot,
        persona: PersonaProfile,
        state: ToronState,
        mut ambient: ToronAdaptiveMetadata,
        classification: IntentClassification,
    ) -> (SessionState, ContextBundle) {
        ambient.state = state.activity;
        let compiled = self.compiler.compile(&window, &persona, &state, &classification);
        let shaped = self.shaper.shape(&compiled, &trace);
        let next = SessionState {
            trace,
            window,
            persona,
            state,
            compiled,
            shaped,
            ambient,
            last_classification: classification,
        };
        let bundle = next.bundle();
        (next, bundle)
    }
}
