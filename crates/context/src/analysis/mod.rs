//! Per-utterance analysis: classification, persona selection and the
//! conversational state machine.
//!
//! All three are pure. They read a classification or a previous state and
//! return a new value; none of them holds session data.

pub mod classifier;
pub mod persona;
pub mod state_machine;

pub use classifier::{IntentClassification, IntentClassifier, extract_topic};
pub use persona::{Persona, PersonaEngine, PersonaProfile, VisualBias};
pub use state_machine::{ActivityState, BackendSignal, ConversationPhase, StateMachine, ToronState};
