//! Context compiler: folds the window, persona, state and classification
//! into a single per-turn summary.
//!
//! The semantic summary is a `" | "`-joined line:
//!
//! ```text
//! <persona tone> | phase:<phase> | intent:<intent> | <role:intent:summary>|<...>
//! ```
//!
//! The distillation covers the last eight window entries and the whole line
//! is truncated to 300 characters. Window summaries are already scrubbed, so
//! nothing here touches raw text.

use crate::analysis::{ConversationPhase, IntentClassification, PersonaProfile, ToronState};
use crate::history::ContextWindow;
use serde::{Deserialize, Serialize};
use toron_config::MAX_WINDOW_SIZE;
use toron_core::{sanitize, score};

/// Maximum length of [`CompiledContext::semantic_context`].
pub const SEMANTIC_CONTEXT_LIMIT: usize = 300;

/// Number of recent entries folded into the distillation.
pub const DISTILL_ENTRIES: usize = 8;

/// The synthesized per-turn summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledContext {
    pub semantic_context: String,
    pub conversation_phase: ConversationPhase,
    pub difficulty_score: f64,
    pub continuity_score: f64,
}

impl Default for CompiledContext {
    fn default() -> Self {
        Self {
            semantic_context: String::new(),
            conversation_phase: ConversationPhase::Exploration,
            difficulty_score: 0.0,
            continuity_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextCompiler;

impl ContextCompiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(
        &self,
        window: &ContextWindow,
        persona: &PersonaProfile,
        state: &ToronState,
        classification: &IntentClassification,
    ) -> CompiledContext {
        let distillation = window
            .recent(DISTILL_ENTRIES)
            .map(|e| format!("{}:{}:{}", e.role, e.intent, e.summary))
            .collect::<Vec<_>>()
            .join("|");

        let line = [
            persona.tone.clone(),
            format!("phase:{}", state.phase),
            format!("intent:{}", classification.intent),
            distillation,
        ]
        .join(" | ");

        let continuity_score = score::unit(window.len() as f64 / MAX_WINDOW_SIZE as f64);

        let difficulty_score = if window.is_empty() {
            0.0
        } else {
            // Each component is in [0, 1], so |v| is at most sqrt(3).
            let mean_magnitude = window.entries().map(|e| e.vector_magnitude()).sum::<f64>()
                / window.len() as f64
                / 3.0_f64.sqrt();
            score::unit(0.5 * mean_magnitude + 0.5 * score::unit(classification.confidence))
        };

        CompiledContext {
            semantic_context: sanitize::truncate_chars(&line, SEMANTIC_CONTEXT_LIMIT),
            conversation_phase: state.phase,
            difficulty_score,
            continuity_score,
        }
    }
}
