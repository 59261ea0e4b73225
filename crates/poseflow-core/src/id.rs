//! Identity types for PoseFlow
//!
//! Pose identifiers are the integer class ids of the pose-classification
//! model, so they stay small and copyable.

use std::fmt;

/// Pose identity - the model class id of a catalog pose
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PoseId(pub u32);

impl PoseId {
    pub const ZERO: PoseId = PoseId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        PoseId(id)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for PoseId {
    fn from(id: u32) -> Self {
        PoseId(id)
    }
}

impl fmt::Debug for PoseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pose({})", self.0)
    }
}

impl fmt::Display for PoseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
