//! PoseFlow Runtime - Practice session plumbing
//!
//! Wires the engine to the outside world once per frame:
//! 1. Ask the sampler for the frame's confidences
//! 2. Read the clock
//! 3. Tick the engine
//! 4. Hand the events to the sink
//!
//! The frame loop, settings files and tracing setup live here too.

pub mod error;
pub mod sampler;
pub mod sink;
pub mod session;
pub mod frame_loop;
pub mod settings;
pub mod logging;

pub use error::*;
pub use sampler::*;
pub use sink::*;
pub use session::*;
pub use frame_loop::*;
pub use settings::*;
