//! PoseFlow Core - Fundamental types for pose practice sessions
//!
//! This crate defines the data shared by the engine and its hosts:
//! - Identifiers and timestamps (PoseId, Timestamp)
//! - The pose catalog and sequence configuration
//! - Per-frame confidence samples
//! - Engine events and configuration errors

pub mod id;
pub mod time;
pub mod catalog;
pub mod config;
pub mod sample;
pub mod event;
pub mod error;

pub use id::*;
pub use time::*;
pub use catalog::*;
pub use config::*;
pub use sample::*;
pub use event::*;
pub use error::*;
