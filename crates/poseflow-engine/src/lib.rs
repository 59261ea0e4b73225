//! PoseFlow Engine - Pose hold and sequence progression
//!
//! This crate implements the per-frame engine:
//! - Clocks (monotonic for hosts, manual for tests)
//! - Pose sequence store and cursor
//! - Hold timer: continuous time above threshold
//! - Transition timer: countdown before the next pose
//! - Progression state machine tying them together

pub mod clock;
pub mod sequence;
pub mod hold;
pub mod transition;
pub mod engine;

pub use clock::*;
pub use sequence::*;
pub use hold::*;
pub use transition::*;
pub use engine::*;
