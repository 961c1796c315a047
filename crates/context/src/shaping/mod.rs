//! Derived per-turn context: the compiled summary, the shaped hints and the
//! ambient visualizer metadata.

pub mod adaptive;
pub mod compiler;
pub mod shaper;

pub use adaptive::{AdaptiveResponseEngine, ToronAdaptiveMetadata};
pub use compiler::{CompiledContext, ContextCompiler};
pub use shaper::{ContextShaper, LlmHints, ShapedContextMetadata, StructuralStyle};
