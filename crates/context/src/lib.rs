//! Per-turn context orchestration for Toron.
//!
//! For every user utterance the pipeline:
//!
//! 1. **Scrubs** the raw text (emails and digit runs never go further)
//! 2. **Classifies** intent, emotion and a handful of scores
//! 3. **Updates** the decaying trace and appends to the bounded window
//! 4. **Advances** the conversational state and picks a persona
//! 5. **Compiles and shapes** the context into two bundles, one for the
//!    prompt builder and one for the ambient visualizer
//!
//! A second entry point folds the model's reply back in once the external
//! round trip has completed.
//!
//! # Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`history`] | `SanitizedTrace`, `ContextWindow` |
//! | [`analysis`] | `IntentClassifier`, `PersonaEngine`, `StateMachine` |
//! | [`shaping`] | `ContextCompiler`, `ContextShaper`, `AdaptiveResponseEngine` |
//! | [`pipeline`] | caller-owned `SessionState` and pure `TurnPipeline` transitions |
//! | [`mediator`] | `ContextMediator`, the stateful per-session owner |

pub mod analysis;
pub mod history;
pub mod mediator;
pub mod pipeline;
pub mod shaping;

pub use analysis::{
    ActivityState, BackendSignal, ConversationPhase, IntentClassification, IntentClassifier,
    Persona, PersonaEngine, PersonaProfile, StateMachine, ToronState, VisualBias,
};
pub use history::{
    ContextWindow, ContextWindowEntry, SanitizedTrace, SanitizedTraceSnapshot, TraceUpdate,
};
pub use mediator::ContextMediator;
pub use pipeline::{ContextBundle, SessionState, TurnPipeline, VisualizerMetadata};
pub use shaping::{
    AdaptiveResponseEngine, CompiledContext, ContextCompiler, ContextShaper, LlmHints,
    ShapedContextMetadata, StructuralStyle, ToronAdaptiveMetadata,
};
