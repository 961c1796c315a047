//! Conversational signal vocabulary.
//!
//! These closed enumerations are shared by every pipeline stage. Decision
//! tables downstream match on them exhaustively, so adding a variant is a
//! compile error everywhere a decision has to be made about it.

use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant (model output handed back by the transport)
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an utterance is trying to accomplish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Something is broken and needs fixing
    Support,
    /// Sequencing work: plans, rollouts, schedules
    Planning,
    /// Asking how or whether to do something
    Guidance,
    /// Open-ended idea generation
    Ideation,
    /// Plain conversation (default)
    #[default]
    Dialogue,
    /// An assistant reply flowing back into the pipeline
    Respond,
}

impl Intent {
    /// Intents a user utterance can be classified into, in tie-break order.
    pub const USER_INTENTS: [Intent; 5] = [
        Intent::Support,
        Intent::Planning,
        Intent::Guidance,
        Intent::Ideation,
        Intent::Dialogue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Support => "support",
            Intent::Planning => "planning",
            Intent::Guidance => "guidance",
            Intent::Ideation => "ideation",
            Intent::Dialogue => "dialogue",
            Intent::Respond => "respond",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The dominant emotional tone of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Appreciative,
    Frustrated,
    Concerned,
    #[default]
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Appreciative => "appreciative",
            Emotion::Frustrated => "frustrated",
            Emotion::Concerned => "concerned",
            Emotion::Neutral => "neutral",
        }
    }

    /// Negative emotions route to the empathetic persona.
    pub fn is_negative(&self) -> bool {
        matches!(self, Emotion::Frustrated | Emotion::Concerned)
    }

    /// Parse a scrubbed trace field back into an emotion.
    /// Unknown text is neutral.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "appreciative" => Emotion::Appreciative,
            "frustrated" => Emotion::Frustrated,
            "concerned" => Emotion::Concerned,
            _ => Emotion::Neutral,
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
