//! Session memory: the decaying trace and the bounded turn window.
//!
//! Both hold only scrubbed data. Raw turn text is reduced here and never
//! travels further into the pipeline.

pub mod trace;
pub mod window;

pub use trace::{SanitizedTrace, SanitizedTraceSnapshot, TraceUpdate};
pub use window::{ContextWindow, ContextWindowEntry, derive_meaning_vector};
