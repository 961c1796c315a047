//! Persona selection.
//!
//! A fixed decision table maps each classification to one of six response
//! archetypes. Negative emotion always wins and selects [`Persona::Empathetic`];
//! otherwise the intent picks a row and the complexity threshold picks the
//! column:
//!
//! | Intent | complexity > threshold | otherwise |
//! |--------|------------------------|-----------|
//! | support | Technical | Empathetic |
//! | planning | Analytical | Strategist |
//! | guidance | Technical | Strategist |
//! | ideation | Creative | Creative |
//! | dialogue | Analytical | Companion |
//! | respond | Analytical | Companion |

use crate::analysis::classifier::IntentClassification;
use serde::{Deserialize, Serialize};
use toron_config::PersonaConfig;
use toron_core::{Intent, score};

/// The response-style archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Empathetic,
    Analytical,
    Technical,
    Creative,
    Strategist,
    /// The neutral default.
    #[default]
    Companion,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Empathetic => "empathetic",
            Persona::Analytical => "analytical",
            Persona::Technical => "technical",
            Persona::Creative => "creative",
            Persona::Strategist => "strategist",
            Persona::Companion => "companion",
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            Persona::Empathetic => "warm, patient and validating",
            Persona::Analytical => "precise, structured and evidence-led",
            Persona::Technical => "direct, exact and implementation-focused",
            Persona::Creative => "playful, expansive and associative",
            Persona::Strategist => "goal-oriented, sequenced and pragmatic",
            Persona::Companion => "friendly, balanced and conversational",
        }
    }

    pub fn visual_bias(&self) -> VisualBias {
        let (color_boost, waveform_energy, resonance_shift) = match self {
            Persona::Empathetic => (0.35, 0.30, 0.70),
            Persona::Analytical => (0.20, 0.45, 0.30),
            Persona::Technical => (0.15, 0.60, 0.25),
            Persona::Creative => (0.85, 0.75, 0.60),
            Persona::Strategist => (0.40, 0.55, 0.45),
            Persona::Companion => (0.50, 0.40, 0.50),
        };
        VisualBias {
            color_boost,
            waveform_energy,
            resonance_shift,
        }
        .clamped()
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters the visualizer uses to tint its rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualBias {
    pub color_boost: f64,
    pub waveform_energy: f64,
    pub resonance_shift: f64,
}

impl VisualBias {
    pub fn clamped(self) -> Self {
        Self {
            color_boost: score::unit(self.color_boost),
            waveform_energy: score::unit(self.waveform_energy),
            resonance_shift: score::unit(self.resonance_shift),
        }
    }
}

/// The current response style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub persona: Persona,
    pub tone: String,
    pub visual_bias: VisualBias,
}

impl PersonaProfile {
    pub fn of(persona: Persona) -> Self {
        Self {
            persona,
            tone: persona.tone().to_string(),
            visual_bias: persona.visual_bias(),
        }
    }
}

impl Default for PersonaProfile {
    fn default() -> Self {
        Self::of(Persona::default())
    }
}

/// Applies the decision table.
#[derive(Debug, Clone, Default)]
pub struct PersonaEngine {
    config: PersonaConfig,
}

impl PersonaEngine {
    pub fn new(config: PersonaConfig) -> Self {
        Self { config }
    }

    pub fn derive_persona(&self, classification: &IntentClassification) -> PersonaProfile {
        PersonaProfile::of(self.select(classification))
    }

    fn select(&self, c: &IntentClassification) -> Persona {
        if c.emotion.is_negative() {
            return Persona::Empathetic;
        }

        let deep = c.complexity > self.config.complexity_threshold;
        match (c.intent, deep) {
            (Intent::Support, true) => Persona::Technical,
            (Intent::Support, false) => Persona::Empathetic,
            (Intent::Planning, true) => Persona::Analytical,
            (Intent::Planning, false) => Persona::Strategist,
            (Intent::Guidance, true) => Persona::Technical,
            (Intent::Guidance, false) => Persona::Strategist,
            (Intent::Ideation, _) => Persona::Creative,
            (Intent::Dialogue | Intent::Respond, true) => Persona::Analytical,
            (Intent::Dialogue | Intent::Respond, false) => Persona::Companion,
        }
    }
}
