//! Conversational state machine.
//!
//! One state value tracks two orthogonal dimensions:
//!
//! - **phase**: where the conversation is heading:
//!   `exploration → analysis → resolution → exploration`
//! - **activity**: what the assistant is visibly doing:
//!   `idle → thinking → processing → responding → idle`, with `error`
//!   reachable from anywhere, but only through a backend failure signal
//!
//! [`StateMachine::advance`] is total and keeps no hidden state: the
//! previous state is always passed in.

use crate::analysis::classifier::IntentClassification;
use serde::{Deserialize, Serialize};
use toron_config::StateConfig;
use toron_core::{Emotion, Intent, score};

/// Turn-level conversation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationPhase {
    #[default]
    Exploration,
    Analysis,
    Resolution,
}

impl ConversationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationPhase::Exploration => "exploration",
            ConversationPhase::Analysis => "analysis",
            ConversationPhase::Resolution => "resolution",
        }
    }
}

impl std::fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI-facing activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    #[default]
    Idle,
    Thinking,
    Processing,
    Responding,
    Error,
}

impl ActivityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityState::Idle => "idle",
            ActivityState::Thinking => "thinking",
            ActivityState::Processing => "processing",
            ActivityState::Responding => "responding",
            ActivityState::Error => "error",
        }
    }

    /// One step around the fixed cycle. `Error` steps to `Idle`.
    pub fn next_in_cycle(&self) -> Self {
        match self {
            ActivityState::Idle => ActivityState::Thinking,
            ActivityState::Thinking => ActivityState::Processing,
            ActivityState::Processing => ActivityState::Responding,
            ActivityState::Responding | ActivityState::Error => ActivityState::Idle,
        }
    }
}

impl std::fmt::Display for ActivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata the transport attaches to a model round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSignal {
    /// The backend reported a failure.
    #[serde(default)]
    pub error: bool,
    /// Observed backend activity in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<f64>,
}

impl BackendSignal {
    pub fn failure() -> Self {
        Self {
            error: true,
            activity_level: None,
        }
    }

    pub fn activity(level: f64) -> Self {
        Self {
            error: false,
            activity_level: Some(level),
        }
    }
}

/// The conversational state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToronState {
    pub phase: ConversationPhase,
    pub activity: ActivityState,
    /// How settled the conversation is on one intent.
    pub stability: f64,
    pub last_intent: Intent,
}

impl Default for ToronState {
    fn default() -> Self {
        Self {
            phase: ConversationPhase::Exploration,
            activity: ActivityState::Idle,
            stability: 0.5,
            last_intent: Intent::Dialogue,
        }
    }
}

/// Guarded transitions over [`ToronState`].
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    config: StateConfig,
}

impl StateMachine {
    pub fn new(config: StateConfig) -> Self {
        Self { config }
    }

    /// Compute the next state. Exactly one state is returned for every input.
    pub fn advance(
        &self,
        prev: &ToronState,
        classification: &IntentClassification,
        backend: Option<&BackendSignal>,
    ) -> ToronState {
        let failed = backend.is_some_and(|b| b.error);

        let activity = if failed {
            ActivityState::Error
        } else {
            self.next_activity(prev.activity, classification)
        };

        let phase = if failed {
            prev.phase
        } else {
            self.next_phase(prev, classification)
        };

        let intent = classification.intent;
        let stability = score::unit(if failed {
            prev.stability * 0.5
        } else if intent == Intent::Respond {
            prev.stability + 0.05
        } else if intent == prev.last_intent {
            prev.stability + 0.15
        } else {
            prev.stability * 0.6
        });

        let last_intent = if intent == Intent::Respond {
            prev.last_intent
        } else {
            intent
        };

        ToronState {
            phase,
            activity,
            stability,
            last_intent,
        }
    }

    fn next_activity(&self, prev: ActivityState, c: &IntentClassification) -> ActivityState {
        let active = self.config.activation_threshold;
        match prev {
            // A fresh classification without a failure is the recovery path.
            ActivityState::Error => ActivityState::Idle,
            ActivityState::Idle => {
                if c.complexity > active || c.urgency > active {
                    ActivityState::Thinking
                } else {
                    ActivityState::Idle
                }
            }
            ActivityState::Thinking => {
                if c.complexity > self.config.processing_threshold {
                    ActivityState::Processing
                } else {
                    ActivityState::Responding
                }
            }
            ActivityState::Responding => {
                if c.complexity < active && c.urgency < active {
                    ActivityState::Idle
                } else {
                    ActivityState::Thinking
                }
            }
            ActivityState::Processing => prev.next_in_cycle(),
        }
    }

    fn next_phase(&self, prev: &ToronState, c: &IntentClassification) -> ConversationPhase {
        let from_user = c.intent != Intent::Respond;
        match prev.phase {
            ConversationPhase::Exploration => {
                if from_user && c.complexity >= self.config.analysis_threshold {
                    ConversationPhase::Analysis
                } else {
                    ConversationPhase::Exploration
                }
            }
            ConversationPhase::Analysis => {
                if c.emotion == Emotion::Appreciative
                    || (from_user && c.complexity < self.config.resolution_threshold)
                {
                    ConversationPhase::Resolution
                } else {
                    ConversationPhase::Analysis
                }
            }
            ConversationPhase::Resolution => {
                if from_user
                    && c.intent != prev.last_intent
                    && c.complexity >= self.config.activation_threshold
                {
                    ConversationPhase::Exploration
                } else {
                    ConversationPhase::Resolution
                }
            }
        }
    }
}
