//! Frame loop - steps a session at a steady cadence on tokio
//!
//! Stands in for a display's frame callback. The engine does not depend
//! on the cadence; it only sees timestamps.

use std::time::Duration;

use poseflow_core::Timestamp;
use poseflow_engine::Clock;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{ConfidenceSampler, EventSink, PracticeSession, StepOutcome};

/// Clock on tokio's time source, so paused test time drives it too
#[derive(Clone, Copy, Debug)]
pub struct TokioClock {
    reference: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        TokioClock {
            reference: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        Timestamp::ZERO.saturating_add(self.reference.elapsed())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    pub skipped: u64,
    pub events: u64,
}

impl LoopSummary {
    fn record(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Ticked(n) => {
                self.frames += 1;
                self.events += n as u64;
            }
            StepOutcome::Skipped => self.skipped += 1,
            StepOutcome::Stopped => {}
        }
    }
}

pub struct FrameLoop {
    frame_interval: Duration,
}

impl FrameLoop {
    /// About 60 frames per second
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(16);

    pub fn new(frame_interval: Duration) -> Self {
        FrameLoop { frame_interval }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    fn interval(&self) -> tokio::time::Interval {
        let mut interval = tokio::time::interval(self.frame_interval);
        // A slow frame is dropped rather than replayed in a burst
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    }

    /// Step until `shutdown` turns true, its sender goes away, or the
    /// session stops or finishes
    pub async fn run<S, C, K>(
        &self,
        session: &mut PracticeSession<S, C, K>,
        mut shutdown: watch::Receiver<bool>,
    ) -> LoopSummary
    where
        S: ConfidenceSampler,
        C: Clock,
        K: EventSink,
    {
        let mut interval = self.interval();
        let mut summary = LoopSummary::default();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let outcome = session.step();
                    summary.record(outcome);
                    if outcome == StepOutcome::Stopped || session.is_finished() {
                        break;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            frames = summary.frames,
            skipped = summary.skipped,
            events = summary.events,
            "Frame loop finished"
        );
        summary
    }

    /// Step exactly `frames` times, or until the session stops or finishes
    pub async fn run_frames<S, C, K>(
        &self,
        session: &mut PracticeSession<S, C, K>,
        frames: u64,
    ) -> LoopSummary
    where
        S: ConfidenceSampler,
        C: Clock,
        K: EventSink,
    {
        let mut interval = self.interval();
        let mut summary = LoopSummary::default();

        for _ in 0..frames {
            interval.tick().await;
            let outcome = session.step();
            summary.record(outcome);
            if outcome == StepOutcome::Stopped || session.is_finished() {
                break;
            }
        }

        summary
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poseflow_core::{
        CompletionPolicy, ConfidenceSample, EngineEvent, PoseCatalog, PoseId, SequenceConfig,
    };

    fn always(confidence: f32) -> impl FnMut() -> Option<ConfidenceSample> {
        move || Some(ConfidenceSample::from_pairs([(PoseId(0), confidence), (PoseId(1), confidence)]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_frames_counts() {
        let mut session =
            PracticeSession::new(PoseCatalog::dance(), always(0.9), TokioClock::new(), Vec::<EngineEvent>::new());
        session.start(SequenceConfig::new(vec![PoseId(0)])).unwrap();

        let summary = FrameLoop::default().run_frames(&mut session, 10).await;
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.events as usize, session.sink().len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_sequence_finishes() {
        let mut session =
            PracticeSession::new(PoseCatalog::dance(), always(0.9), TokioClock::new(), Vec::<EngineEvent>::new());
        let config = SequenceConfig::new(vec![PoseId(0), PoseId(1)])
            .with_hold_secs(0.5)
            .with_transition_secs(1.0)
            .with_completion(CompletionPolicy::StopAtEnd);
        session.start(config).unwrap();

        let (_tx, rx) = watch::channel(false);
        let summary = FrameLoop::default().run(&mut session, rx).await;

        assert!(session.is_finished());
        let completed = session
            .sink()
            .iter()
            .filter(|e| **e == EngineEvent::SequenceCompleted)
            .count();
        assert_eq!(completed, 1);
        // Two holds plus two transitions at ~60 fps
        assert!(summary.frames > 150);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_signal_stops_loop() {
        let mut session =
            PracticeSession::new(PoseCatalog::dance(), always(0.1), TokioClock::new(), Vec::<EngineEvent>::new());
        session.start(SequenceConfig::new(vec![PoseId(0)])).unwrap();

        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = tx.send(true);
        });

        let summary = FrameLoop::default().run(&mut session, rx).await;
        assert!(summary.frames >= 10);
        assert!(session.is_running());
    }
}
