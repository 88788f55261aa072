//! Omikuji Draw Engine
//!
//! Weighted fortune draws and the phase sequence of a single draw, with no
//! rendering or animation dependencies. Hosts drive the sequence with input
//! and animation-finished events.

pub mod catalog;
pub mod draw;
pub mod sequence;

pub use catalog::{Category, FortuneCatalog, FortuneLevel, catalog};
pub use draw::{Fortune, draw_level, generate_fortune};
pub use sequence::{DrawPhase, DrawSequence, TransitionError};
