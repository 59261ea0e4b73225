//! Error types for the PoseFlow runtime

use poseflow_core::ConfigurationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session already running")]
    AlreadyRunning,
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
