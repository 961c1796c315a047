//! Adaptive response engine: ambient metadata for the visualizer.
//!
//! Independent of the compiled and shaped context: it reads only the
//! persona, the classification, the previous state and an optional backend
//! signal. A backend failure forces the `error` activity and collapses
//! confidence; an activity level nudges agreement upward.

use crate::analysis::{
    ActivityState, BackendSignal, IntentClassification, Persona, PersonaProfile, ToronState,
};
use serde::{Deserialize, Serialize};
use toron_core::{Emotion, score};

/// Share of confidence kept when the backend reports a failure.
pub const ERROR_CONFIDENCE_RETENTION: f64 = 0.2;

/// The ambient-visualization bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToronAdaptiveMetadata {
    /// In `[-1, 1]`.
    pub sentiment: f64,
    pub confidence: f64,
    pub bias: f64,
    pub hallucination_risk: f64,
    pub complexity: f64,
    pub llm_agreement: f64,
    pub state: ActivityState,
}

impl Default for ToronAdaptiveMetadata {
    fn default() -> Self {
        Self {
            sentiment: 0.0,
            confidence: 0.5,
            bias: 0.5,
            hallucination_risk: 0.0,
            complexity: 0.0,
            llm_agreement: 0.5,
            state: ActivityState::Idle,
        }
    }
}

impl ToronAdaptiveMetadata {
    /// Apply a backend failure to an already-built bundle.
    pub fn collapse(mut self) -> Self {
        self.confidence = score::unit(self.confidence * ERROR_CONFIDENCE_RETENTION);
        self.llm_agreement = score::unit(self.llm_agreement * 0.5);
        self.hallucination_risk = score::unit(self.hallucination_risk + 0.2);
        self.state = ActivityState::Error;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdaptiveResponseEngine;

impl AdaptiveResponseEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn build_adaptive_response(
        &self,
        persona: &PersonaProfile,
        classification: &IntentClassification,
        prev_state: &ToronState,
        backend: Option<&BackendSignal>,
    ) -> ToronAdaptiveMetadata {
        let c = classification;
        let confidence_in = score::unit(c.confidence);
        let complexity_in = score::unit(c.complexity);
        let urgency = score::unit(c.urgency);
        let semantic = score::unit(c.semantic_density);
        let emotional = score::unit(c.emotional_density);

        let (mut sentiment, mut confidence, mut complexity, mut bias, mut hallucination) = (
            sentiment_base(c.emotion),
            0.5 * confidence_in + 0.3 * semantic + 0.2 * (1.0 - emotional),
            0.7 * complexity_in + 0.3 * semantic,
            0.3 + 0.4 * emotional,
            0.4 * complexity_in + 0.3 * (1.0 - confidence_in) + 0.2 * urgency,
        );

        match persona.persona {
            Persona::Empathetic => {
                sentiment += 0.1;
                bias += 0.2;
            }
            Persona::Technical => {
                confidence += 0.1;
                complexity += 0.1;
            }
            Persona::Analytical => {
                sentiment -= 0.05;
                hallucination -= 0.15;
            }
            Persona::Creative => {
                sentiment += 0.05;
                hallucination += 0.1;
            }
            Persona::Companion => sentiment += 0.05,
            Persona::Strategist => {}
        }

        let mut agreement = 0.4 + 0.4 * confidence_in - 0.2 * score::unit(hallucination);
        if prev_state.activity == ActivityState::Error {
            agreement -= 0.1;
        }
        if let Some(level) = backend.and_then(|b| b.activity_level) {
            agreement += 0.1 * score::unit(level);
        }

        let metadata = ToronAdaptiveMetadata {
            sentiment: score::signed(sentiment),
            confidence: score::unit(confidence),
            bias: score::unit(bias),
            hallucination_risk: score::unit(hallucination),
            complexity: score::unit(complexity),
            llm_agreement: score::unit(agreement),
            state: match prev_state.activity {
                ActivityState::Error => ActivityState::Idle,
                other => other,
            },
        };

        if backend.is_some_and(|b| b.error) {
            metadata.collapse()
        } else {
            metadata
        }
    }
}

fn sentiment_base(emotion: Emotion) -> f64 {
    match emotion {
        Emotion::Appreciative => 0.6,
        Emotion::Neutral => 0.0,
        Emotion::Concerned => -0.35,
        Emotion::Frustrated => -0.6,
    }
}
