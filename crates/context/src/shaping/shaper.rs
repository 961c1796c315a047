//! Context shaper: turns the compiled context and the trace into the hint
//! bundle both downstream consumers read.
//!
//! Every output is a fixed linear combination of its inputs, clamped to
//! `[0, 1]` on its own:
//!
//! | Output | Formula |
//! |--------|---------|
//! | emotional temperature | `0.3 + 0.4 * momentum + emotion weight` |
//! | safety bias | `0.6 * safety_weight + 0.4 * hallucination_risk` |
//! | reasoning | `0.4 + 0.4 * difficulty + 0.2 * safety_bias` |
//! | creativity | `0.7 - 0.3 * difficulty - 0.3 * safety_bias` |
//! | brevity | `0.6 - 0.4 * difficulty + 0.2 * safety_bias` |
//! | meta confidence | `0.4 + 0.6 * continuity - 0.5 * hallucination_risk` |

use crate::analysis::ConversationPhase;
use crate::history::SanitizedTraceSnapshot;
use crate::shaping::CompiledContext;
use serde::{Deserialize, Serialize};
use toron_core::{Emotion, score};

/// How tightly the downstream prompt should be structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuralStyle {
    Tight,
    Loose,
    #[default]
    Balanced,
}

impl StructuralStyle {
    pub fn for_phase(phase: ConversationPhase) -> Self {
        match phase {
            ConversationPhase::Analysis => StructuralStyle::Tight,
            ConversationPhase::Exploration => StructuralStyle::Loose,
            ConversationPhase::Resolution => StructuralStyle::Balanced,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StructuralStyle::Tight => "tight",
            StructuralStyle::Loose => "loose",
            StructuralStyle::Balanced => "balanced",
        }
    }
}

/// Generation hints for the prompt builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LlmHints {
    pub reasoning: f64,
    pub creativity: f64,
    pub brevity: f64,
}

/// The shaped per-turn hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedContextMetadata {
    pub llm_hints: LlmHints,
    pub emotional_temperature: f64,
    pub structural_style: StructuralStyle,
    pub safety_bias: f64,
    pub meta_confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ContextShaper;

impl ContextShaper {
    pub fn new() -> Self {
        Self
    }

    pub fn shape(
        &self,
        compiled: &CompiledContext,
        trace: &SanitizedTraceSnapshot,
    ) -> ShapedContextMetadata {
        let momentum = score::unit(trace.conversation_momentum);
        let safety_weight = score::unit(trace.safety_weight);
        let hallucination = score::unit(trace.hallucination_risk);
        let difficulty = score::unit(compiled.difficulty_score);
        let continuity = score::unit(compiled.continuity_score);

        let emotional_temperature =
            score::unit(0.3 + 0.4 * momentum + emotion_weight(Emotion::from_label(&trace.emotion)));
        let safety_bias = score::unit(0.6 * safety_weight + 0.4 * hallucination);

        let llm_hints = LlmHints {
            reasoning: score::unit(0.4 + 0.4 * difficulty + 0.2 * safety_bias),
            creativity: score::unit(0.7 - 0.3 * difficulty - 0.3 * safety_bias),
            brevity: score::unit(0.6 - 0.4 * difficulty + 0.2 * safety_bias),
        };

        ShapedContextMetadata {
            llm_hints,
            emotional_temperature,
            structural_style: StructuralStyle::for_phase(compiled.conversation_phase),
            safety_bias,
            meta_confidence: score::unit(0.4 + 0.6 * continuity - 0.5 * hallucination),
        }
    }
}

fn emotion_weight(emotion: Emotion) -> f64 {
    match emotion {
        Emotion::Frustrated => 0.3,
        Emotion::Concerned => 0.2,
        Emotion::Appreciative => 0.15,
        Emotion::Neutral => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(m: &ShapedContextMetadata) -> [f64; 6] {
        [
            m.llm_hints.reasoning,
            m.llm_hints.creativity,
            m.llm_hints.brevity,
            m.emotional_temperature,
            m.safety_bias,
            m.meta_confidence,
        ]
    }

    #[test]
    fn style_follows_phase() {
        let shaper = ContextShaper::new();
        let trace = SanitizedTraceSnapshot::default();
        for (phase, style) in [
            (ConversationPhase::Analysis, StructuralStyle::Tight),
            (ConversationPhase::Exploration, StructuralStyle::Loose),
            (ConversationPhase::Resolution, StructuralStyle::Balanced),
        ] {
            let compiled = CompiledContext {
                conversation_phase: phase,
                ..CompiledContext::default()
            };
            assert_eq!(shaper.shape(&compiled, &trace).structural_style, style);
        }
    }

    #[test]
    fn defaults_shape_to_known_values() {
        let shaped = ContextShaper::new().shape(
            &CompiledContext::default(),
            &SanitizedTraceSnapshot::default(),
        );
        assert!((shaped.emotional_temperature - 0.3).abs() < 1e-12);
        assert!((shaped.safety_bias - 0.3).abs() < 1e-12);
        assert!((shaped.llm_hints.reasoning - 0.46).abs() < 1e-12);
        assert!((shaped.llm_hints.creativity - 0.61).abs() < 1e-12);
        assert!((shaped.llm_hints.brevity - 0.66).abs() < 1e-12);
        assert!((shaped.meta_confidence - 0.4).abs() < 1e-12);
    }

    #[test]
    fn negative_emotion_warms_temperature() {
        let shaper = ContextShaper::new();
        let calm = SanitizedTraceSnapshot::default();
        let upset = SanitizedTraceSnapshot {
            emotion: "frustrated".into(),
            ..SanitizedTraceSnapshot::default()
        };
        let compiled = CompiledContext::default();
        assert!(
            shaper.shape(&compiled, &upset).emotional_temperature
                > shaper.shape(&compiled, &calm).emotional_temperature
        );
    }

    #[test]
    fn hallucination_risk_lowers_meta_confidence() {
        let shaper = ContextShaper::new();
        let compiled = CompiledContext {
            continuity_score: 0.5,
            ..CompiledContext::default()
        };
        let safe = SanitizedTraceSnapshot::default();
        let risky = SanitizedTraceSnapshot {
            hallucination_risk: 0.8,
            ..SanitizedTraceSnapshot::default()
        };
        assert!(
            shaper.shape(&compiled, &risky).meta_confidence
                < shaper.shape(&compiled, &safe).meta_confidence
        );
    }

    #[test]
    fn outputs_stay_in_range_for_hostile_inputs() {
        let shaper = ContextShaper::new();
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -5.0, 5.0, 0.5] {
            let compiled = CompiledContext {
                difficulty_score: value,
                continuity_score: value,
                ..CompiledContext::default()
            };
            let trace = SanitizedTraceSnapshot {
                emotion: "frustrated".into(),
                conversation_momentum: value,
                safety_weight: value,
                hallucination_risk: value,
                ..SanitizedTraceSnapshot::default()
            };
            for v in outputs(&shaper.shape(&compiled, &trace)) {
                assert!((0.0..=1.0).contains(&v), "{v} out of range for input {value}");
            }
        }
    }
}
