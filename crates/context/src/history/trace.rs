//! Sanitized trace: a decaying summary of session mood and risk.
//!
//! The trace holds a handful of exponential-moving scores and three short
//! scrubbed labels. It never stores raw text: every label passes through
//! [`sanitize::scrub_field`] before it is kept.
//!
//! Update rules (retentions come from [`TraceConfig`]):
//!
//! | Field | Rule |
//! |-------|------|
//! | momentum | `m * momentum_retention + boost` |
//! | hallucination risk | `h * hallucination_retention + adjustment` |
//! | safety weight, agreement | blend toward target, keeping `blend_retention` |
//!
//! Every write re-clamps to `[0, 1]`. A non-finite input leaves its field
//! untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use toron_config::TraceConfig;
use toron_core::{sanitize, score};

/// Resting value safety weight decays toward.
pub const SAFETY_BASELINE: f64 = 0.5;

/// Resting value model agreement decays toward.
pub const AGREEMENT_BASELINE: f64 = 0.5;

/// An immutable copy of the trace state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizedTraceSnapshot {
    pub intent: String,
    pub emotion: String,
    pub topic: String,
    pub conversation_momentum: f64,
    pub safety_weight: f64,
    pub hallucination_risk: f64,
    pub llm_agreement: f64,
    /// `None` until the first update.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for SanitizedTraceSnapshot {
    fn default() -> Self {
        Self {
            intent: String::new(),
            emotion: "neutral".into(),
            topic: String::new(),
            conversation_momentum: 0.0,
            safety_weight: SAFETY_BASELINE,
            hallucination_risk: 0.0,
            llm_agreement: AGREEMENT_BASELINE,
            last_updated: None,
        }
    }
}

/// A partial set of new signals. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct TraceUpdate {
    pub intent: Option<String>,
    pub emotion: Option<String>,
    pub topic: Option<String>,
    /// Added to the retained momentum.
    pub momentum_boost: Option<f64>,
    /// Target the safety weight blends toward.
    pub safety_weight: Option<f64>,
    /// Added to the retained hallucination risk.
    pub hallucination_adjustment: Option<f64>,
    /// Target the agreement score blends toward.
    pub llm_agreement: Option<f64>,
}

/// The decaying trace itself.
#[derive(Debug, Clone)]
pub struct SanitizedTrace {
    config: TraceConfig,
    state: SanitizedTraceSnapshot,
}

impl SanitizedTrace {
    pub fn new(config: TraceConfig) -> Self {
        Self {
            config,
            state: SanitizedTraceSnapshot::default(),
        }
    }

    /// Rebuild a trace around a previously taken snapshot. Scores are
    /// re-clamped, text fields are kept as stored.
    pub fn resume(config: TraceConfig, snapshot: SanitizedTraceSnapshot) -> Self {
        let mut state = snapshot;
        state.conversation_momentum = score::unit(state.conversation_momentum);
        state.safety_weight = score::unit(state.safety_weight);
        state.hallucination_risk = score::unit(state.hallucination_risk);
        state.llm_agreement = score::unit(state.llm_agreement);
        Self { config, state }
    }

    /// Merge new signals into the decaying state.
    pub fn update(&mut self, update: TraceUpdate, now: DateTime<Utc>) {
        let limit = self.config.text_limit;
        let state = &mut self.state;

        for (slot, value) in [
            (&mut state.intent, update.intent),
            (&mut state.emotion, update.emotion),
            (&mut state.topic, update.topic),
        ] {
            if let Some(text) = value {
                let scrubbed = sanitize::scrub_field(&text, limit);
                if !scrubbed.is_empty() {
                    *slot = scrubbed;
                }
            }
        }

        if let Some(boost) = update.momentum_boost.and_then(score::finite) {
            state.conversation_momentum =
                score::unit(state.conversation_momentum * self.config.momentum_retention + boost);
        }

        if let Some(adjustment) = update.hallucination_adjustment.and_then(score::finite) {
            state.hallucination_risk = score::unit(
                state.hallucination_risk * self.config.hallucination_retention + adjustment,
            );
        }

        let pull = 1.0 - self.config.blend_retention;
        if let Some(target) = update.safety_weight.and_then(score::finite) {
            state.safety_weight =
                score::unit(score::blend(state.safety_weight, score::unit(target), pull));
        }
        if let Some(target) = update.llm_agreement.and_then(score::finite) {
            state.llm_agreement =
                score::unit(score::blend(state.llm_agreement, score::unit(target), pull));
        }

        state.last_updated = Some(now);
    }

    /// Attenuate the scores by the time elapsed since the last write.
    ///
    /// Momentum and hallucination risk halve every `decay_half_life_secs`;
    /// safety weight and agreement relax toward their baselines at the same
    /// rate. A trace that was never updated, or a clock that has not moved
    /// forward, is left unchanged.
    pub fn decay(&mut self, now: DateTime<Utc>) {
        let Some(last) = self.state.last_updated else {
            return;
        };
        let elapsed = (now - last).num_milliseconds() as f64 / 1000.0;
        if elapsed <= 0.0 {
            return;
        }

        let factor = 0.5_f64.powf(elapsed / self.config.decay_half_life_secs);
        let state = &mut self.state;
        state.conversation_momentum = score::unit(state.conversation_momentum * factor);
        state.hallucination_risk = score::unit(state.hallucination_risk * factor);
        state.safety_weight =
            score::unit(SAFETY_BASELINE + (state.safety_weight - SAFETY_BASELINE) * factor);
        state.llm_agreement =
            score::unit(AGREEMENT_BASELINE + (state.llm_agreement - AGREEMENT_BASELINE) * factor);
        state.last_updated = Some(now);
    }

    /// Reset to defaults.
    pub fn wipe(&mut self) {
        self.state = SanitizedTraceSnapshot::default();
    }

    pub fn snapshot(&self) -> SanitizedTraceSnapshot {
        self.state.clone()
    }

    /// Borrow the current state without copying.
    pub fn current(&self) -> &SanitizedTraceSnapshot {
        &self.state
    }
}

impl Default for SanitizedTrace {
    fn default() -> Self {
        Self::new(TraceConfig::default())
    }
}
