//! Routine simulator
//!
//! Drives a `PracticeSession` on a `ManualClock` with a fixed frame
//! interval. Each frame ticks at the current time, then the clock moves
//! one interval forward, so the first tick lands at `t = 0`.

use std::time::Duration;

use poseflow_core::{EngineEvent, PoseCatalog, SequenceConfig, Timestamp};
use poseflow_engine::{EngineStats, ManualClock, Phase};
use poseflow_runtime::{ConfidenceSampler, PracticeSession, SessionResult, StepOutcome};

use crate::TargetHandle;

/// Counters for one simulated routine
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutineSummary {
    pub frames: u64,
    pub skipped_frames: u64,
    pub events: usize,
    pub holds_started: u64,
    pub holds_reset: u64,
    pub holds_completed: u64,
    pub poses_advanced: u64,
    pub cycles_completed: u64,
    pub sample_gaps: u64,
    pub elapsed: Duration,
}

pub struct RoutineSimulator<S> {
    session: PracticeSession<S, ManualClock, Vec<EngineEvent>>,
    clock: ManualClock,
    frame_interval: Duration,
    target: Option<TargetHandle>,
    seen: usize,
    final_stats: Option<EngineStats>,
}

impl<S: ConfidenceSampler> RoutineSimulator<S> {
    pub fn new(catalog: PoseCatalog, sampler: S, frame_interval: Duration) -> Self {
        let clock = ManualClock::new();
        RoutineSimulator {
            session: PracticeSession::new(catalog, sampler, clock.clone(), Vec::new()),
            clock,
            frame_interval,
            target: None,
            seen: 0,
            final_stats: None,
        }
    }

    /// Point `target` at each new pose as the engine advances
    pub fn with_target(mut self, target: TargetHandle) -> Self {
        self.target = Some(target);
        self
    }

    pub fn start(&mut self, config: SequenceConfig) -> SessionResult<()> {
        self.session.start(config)?;
        self.final_stats = None;
        if let (Some(target), Some(engine)) = (&self.target, self.session.engine()) {
            target.set(engine.current_pose().id);
        }
        Ok(())
    }

    /// One frame, then advance the clock
    pub fn step(&mut self) -> StepOutcome {
        let outcome = self.session.step();
        self.follow_new_events();
        self.clock.advance(self.frame_interval);
        outcome
    }

    fn follow_new_events(&mut self) {
        let events = self.session.sink();
        if let Some(target) = &self.target {
            for event in &events[self.seen..] {
                if let EngineEvent::PoseAdvanced { new_class_id, .. } = event {
                    target.set(*new_class_id);
                }
            }
        }
        self.seen = events.len();
    }

    /// Step for `duration` of simulated time, or until the session ends
    pub fn run_for(&mut self, duration: Duration) -> u64 {
        let end = self.now().saturating_add(duration);
        let mut frames = 0;
        while self.now() < end {
            if self.step() == StepOutcome::Stopped {
                break;
            }
            frames += 1;
            if self.session.is_finished() {
                break;
            }
        }
        frames
    }

    /// Step until an event matches `pred`. Returns the tick time of the
    /// matching frame, or `None` after `max_frames`.
    pub fn run_until<P>(&mut self, mut pred: P, max_frames: u64) -> Option<Timestamp>
    where
        P: FnMut(&EngineEvent) -> bool,
    {
        for _ in 0..max_frames {
            let at = self.now();
            let from = self.seen;
            if self.step() == StepOutcome::Stopped {
                return None;
            }
            if self.session.sink()[from..].iter().any(&mut pred) {
                return Some(at);
            }
        }
        None
    }

    /// Stop the session, keeping its final counters for `summary`
    pub fn stop(&mut self) -> Option<EngineStats> {
        let stats = self.session.stop();
        if stats.is_some() {
            self.final_stats = stats.clone();
        }
        stats
    }

    pub fn now(&self) -> Timestamp {
        poseflow_engine::Clock::now(&self.clock)
    }

    pub fn phase(&self) -> Phase {
        self.session
            .engine()
            .map(|e| e.phase())
            .unwrap_or(Phase::Idle)
    }

    pub fn events(&self) -> &[EngineEvent] {
        self.session.sink()
    }

    /// Drop collected events
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.seen = 0;
        std::mem::take(self.session.sink_mut())
    }

    pub fn session(&self) -> &PracticeSession<S, ManualClock, Vec<EngineEvent>> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PracticeSession<S, ManualClock, Vec<EngineEvent>> {
        &mut self.session
    }

    pub fn summary(&self) -> RoutineSummary {
        let runtime = self.session.stats();
        let engine = self
            .session
            .engine()
            .map(|e| e.stats().clone())
            .or_else(|| self.final_stats.clone())
            .unwrap_or_default();

        RoutineSummary {
            frames: runtime.frames,
            skipped_frames: runtime.skipped_frames,
            events: self.session.sink().len(),
            holds_started: engine.holds_started,
            holds_reset: engine.holds_reset,
            holds_completed: engine.holds_completed,
            poses_advanced: engine.poses_advanced,
            cycles_completed: engine.cycles_completed,
            sample_gaps: engine.sample_gaps,
            elapsed: self.now() - Timestamp::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoiseConfig, NoisySampler, ScriptedSampler};
    use poseflow_core::{CompletionPolicy, PoseId};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_first_tick_at_zero() {
        let sampler = ScriptedSampler::confidences(PoseId(0), &[0.9, 0.9]);
        let mut sim = RoutineSimulator::new(PoseCatalog::dance(), sampler, Duration::from_secs(1));
        sim.start(SequenceConfig::new(vec![PoseId(0)])).unwrap();

        let at = sim.run_until(|e| matches!(e, EngineEvent::HoldStarted { .. }), 5);
        assert_eq!(at, Some(Timestamp::ZERO));
        assert_eq!(sim.now(), Timestamp::from_secs(1));
        assert_eq!(sim.phase(), Phase::Holding);
    }

    #[test]
    fn test_steady_performer_completes_routine() {
        let catalog = PoseCatalog::yoga();
        let classes: Vec<_> = catalog.entries().iter().map(|e| e.id).collect();
        let target: TargetHandle = Rc::new(Cell::new(PoseId::ZERO));
        let sampler = NoisySampler::new(NoiseConfig::steady(), classes, target.clone(), 42);

        let mut sim = RoutineSimulator::new(catalog, sampler, Duration::from_millis(20))
            .with_target(target);
        let config = SequenceConfig::new(vec![PoseId(0), PoseId(1), PoseId(2)])
            .with_hold_secs(1.0)
            .with_transition_secs(1.0)
            .with_completion(CompletionPolicy::StopAtEnd);
        sim.start(config).unwrap();

        sim.run_for(Duration::from_secs(30));

        let summary = sim.summary();
        assert_eq!(sim.phase(), Phase::Completed);
        assert_eq!(summary.holds_completed, 3);
        assert_eq!(summary.poses_advanced, 3);
        assert_eq!(summary.cycles_completed, 1);
        assert_eq!(summary.holds_reset, 0);
        // Three holds and three transitions, a frame of slack each
        assert!(summary.elapsed <= Duration::from_millis(6_200));
    }

    #[test]
    fn test_summary_survives_stop() {
        let sampler = ScriptedSampler::confidences(PoseId(0), &[0.9; 4]);
        let mut sim = RoutineSimulator::new(PoseCatalog::dance(), sampler, Duration::from_secs(1));
        sim.start(SequenceConfig::new(vec![PoseId(0)])).unwrap();
        sim.run_for(Duration::from_secs(2));

        let stats = sim.stop().unwrap();
        let summary = sim.summary();
        assert_eq!(summary.holds_started, stats.holds_started);
        assert_eq!(summary.frames, 2);
        assert_eq!(sim.phase(), Phase::Idle);
    }
}
