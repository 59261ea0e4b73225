//! Error types for PoseFlow

use thiserror::Error;

use crate::{PoseId, Timestamp};

/// Configuration errors, raised only when a session starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Pose sequence is empty")]
    EmptySequence,

    #[error("Accuracy threshold out of range [0, 1]: {0}")]
    ThresholdOutOfRange(f32),

    #[error("Hold duration must be positive: {0}s")]
    NonPositiveHold(f64),

    #[error("Transition duration must not be negative: {0}s")]
    NegativeTransition(f64),

    #[error("Duration too long: {0}s")]
    DurationTooLong(f64),

    #[error("Pose {0} is not in the catalog")]
    UnknownPose(PoseId),

    #[error("No catalog pose is labelled {0:?}")]
    UnknownLabel(String),

    #[error("Duplicate catalog id: {0}")]
    DuplicateCatalogId(PoseId),

    #[error("Duplicate catalog label: {0:?}")]
    DuplicateCatalogLabel(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// A tick whose sample had no entry for the expected pose.
///
/// Never raised; the tick proceeds with confidence 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGapWarning {
    /// Pose the engine was waiting for
    pub class_id: PoseId,
    /// Tick timestamp
    pub at: Timestamp,
}

impl std::fmt::Display for SampleGapWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sample at {:?} has no confidence for expected pose {}",
            self.at, self.class_id
        )
    }
}
