//! Engine events
//!
//! The engine reports everything it decides through these events. Hosts
//! turn them into text, colours and sounds; the engine itself never does.

use crate::{ClassScore, PoseId};

/// Event emitted by a tick, in emission order
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// Confidence for the expected pose this frame
    ConfidenceUpdated {
        class_id: PoseId,
        probability: f32,
        threshold_met: bool,
        /// Hold time still needed; the full hold when no hold is running
        hold_remaining_secs: f64,
        /// Frame's top class, if the sample had any entries
        best: Option<ClassScore>,
    },
    HoldStarted {
        class_id: PoseId,
    },
    HoldReset {
        class_id: PoseId,
    },
    HoldCompleted {
        class_id: PoseId,
    },
    TransitionTick {
        remaining_secs: u32,
    },
    PoseAdvanced {
        new_class_id: PoseId,
        cursor: usize,
    },
    SequenceCompleted,
}

impl EngineEvent {
    /// Event name as hosts know it
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::ConfidenceUpdated { .. } => "confidenceUpdated",
            EngineEvent::HoldStarted { .. } => "holdStarted",
            EngineEvent::HoldReset { .. } => "holdReset",
            EngineEvent::HoldCompleted { .. } => "holdCompleted",
            EngineEvent::TransitionTick { .. } => "transitionTick",
            EngineEvent::PoseAdvanced { .. } => "poseAdvanced",
            EngineEvent::SequenceCompleted => "sequenceCompleted",
        }
    }

    /// Events that mark progress through the routine (everything but
    /// per-frame confidence and countdown updates)
    pub fn is_milestone(&self) -> bool {
        !matches!(
            self,
            EngineEvent::ConfidenceUpdated { .. } | EngineEvent::TransitionTick { .. }
        )
    }
}
