//! Event sinks - where engine events go after each tick

use poseflow_core::EngineEvent;

pub trait EventSink {
    fn on_event(&mut self, event: &EngineEvent);
}

/// Records every event
impl EventSink for Vec<EngineEvent> {
    fn on_event(&mut self, event: &EngineEvent) {
        self.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_event(&mut self, event: &EngineEvent) {
        (**self).on_event(event)
    }
}

/// Fan out to two sinks, in order
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn on_event(&mut self, event: &EngineEvent) {
        self.0.on_event(event);
        self.1.on_event(event);
    }
}

/// Closure sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(&EngineEvent)> EventSink for FnSink<F> {
    fn on_event(&mut self, event: &EngineEvent) {
        (self.0)(event)
    }
}

/// Logs events through `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::ConfidenceUpdated {
                class_id,
                probability,
                threshold_met,
                hold_remaining_secs,
                ..
            } => tracing::trace!(
                pose = %class_id,
                probability,
                threshold_met,
                hold_remaining_secs,
                "confidence"
            ),
            EngineEvent::TransitionTick { remaining_secs } => {
                tracing::debug!(remaining_secs, "Next pose in")
            }
            EngineEvent::PoseAdvanced { new_class_id, cursor } => {
                tracing::info!(pose = %new_class_id, cursor, "Next pose")
            }
            EngineEvent::SequenceCompleted => tracing::info!("Sequence complete"),
            other => tracing::debug!(event = other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poseflow_core::PoseId;

    #[test]
    fn test_fan_out_keeps_order() {
        let mut names = Vec::new();
        let mut recorded: Vec<EngineEvent> = Vec::new();
        {
            let mut sink = (&mut recorded, FnSink(|e: &EngineEvent| names.push(e.name())));
            sink.on_event(&EngineEvent::HoldStarted { class_id: PoseId(1) });
            sink.on_event(&EngineEvent::SequenceCompleted);
            TracingSink.on_event(&EngineEvent::SequenceCompleted);
        }

        assert_eq!(recorded.len(), 2);
        assert_eq!(names, vec!["holdStarted", "sequenceCompleted"]);
    }
}
