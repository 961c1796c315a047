//! # Toron Core
//!
//! Domain vocabulary, error definitions and small shared primitives for the
//! Toron context orchestration pipeline. This crate holds **no pipeline
//! logic**; it defines the values every stage agrees on.
//!
//! ## Contents
//!
//! - [`signal`]: conversational roles, intents and emotions
//! - [`score`]: clamping helpers that keep every score inside its range
//! - [`sanitize`]: privacy scrubbing applied before anything is stored
//! - [`clock`]: injectable time source for timestamps and decay
//! - [`error`]: the top-level error type for the ambient surfaces

pub mod clock;
pub mod error;
pub mod sanitize;
pub mod score;
pub mod signal;

// Re-export key types at crate root for ergonomics
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use signal::{Emotion, Intent, Role};
