//! PoseFlow Test Harness - Routine simulation and scenario validation
//!
//! This crate provides:
//! - Scripted samplers replaying exact confidence sequences
//! - Noisy samplers with jitter, class dropouts and lost frames
//! - A routine simulator on a manual clock
//! - End-to-end scenarios for the progression engine

pub mod samplers;
pub mod simulator;
pub mod scenarios;

pub use samplers::*;
pub use simulator::*;
pub use scenarios::*;
