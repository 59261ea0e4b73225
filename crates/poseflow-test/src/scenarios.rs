//! End-to-end routine scenarios
//!
//! A scenario runs a noisy performer through a routine and checks the
//! event stream for ordering invariants.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use poseflow_core::{CompletionPolicy, EngineEvent, PoseCatalog, PoseId, SequenceConfig};

use crate::{NoiseConfig, NoisySampler, RoutineSimulator, RoutineSummary, TargetHandle};

// ============================================================================
// SCENARIO HARNESS
// ============================================================================

#[derive(Debug, Clone)]
pub struct RoutineScenarioConfig {
    /// Pose ids in practice order (yoga catalog)
    pub poses: Vec<PoseId>,

    pub hold_secs: f64,
    pub transition_secs: f64,

    /// Frame spacing on the simulated clock
    pub frame_interval: Duration,

    /// Simulated time budget
    pub duration: Duration,

    pub noise: NoiseConfig,
    pub seed: u64,
}

impl Default for RoutineScenarioConfig {
    fn default() -> Self {
        Self {
            poses: vec![PoseId(0), PoseId(1), PoseId(3)],
            hold_secs: 2.0,
            transition_secs: 2.0,
            frame_interval: Duration::from_millis(33),
            duration: Duration::from_secs(60),
            noise: NoiseConfig::steady(),
            seed: 0x5EED,
        }
    }
}

impl RoutineScenarioConfig {
    pub fn minimal() -> Self {
        Self {
            poses: vec![PoseId(0)],
            hold_secs: 1.0,
            transition_secs: 1.0,
            duration: Duration::from_secs(10),
            ..Self::default()
        }
    }

    pub fn standard() -> Self {
        Self::default()
    }

    /// Long routine with an unreliable classifier
    pub fn stress() -> Self {
        Self {
            poses: (0..8).map(PoseId).collect(),
            hold_secs: 1.5,
            transition_secs: 1.0,
            frame_interval: Duration::from_millis(16),
            duration: Duration::from_secs(300),
            noise: NoiseConfig::lossy(),
            ..Self::default()
        }
    }

    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RoutineScenarioResult {
    pub summary: RoutineSummary,

    /// Event stream as emitted
    pub events: Vec<EngineEvent>,

    pub violations: Vec<String>,
}

impl RoutineScenarioResult {
    /// Invariants held and at least one full cycle finished
    pub fn passed(&self) -> bool {
        self.violations.is_empty() && self.summary.cycles_completed >= 1
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }
}

/// Run a looping routine for the configured duration
pub fn run_routine_scenario(config: &RoutineScenarioConfig) -> RoutineScenarioResult {
    let catalog = PoseCatalog::yoga();
    let classes: Vec<_> = catalog.entries().iter().map(|e| e.id).collect();
    let target: TargetHandle = Rc::new(Cell::new(PoseId::ZERO));
    let sampler = NoisySampler::new(config.noise.clone(), classes, target.clone(), config.seed);

    let mut sim = RoutineSimulator::new(catalog, sampler, config.frame_interval).with_target(target);
    let sequence = SequenceConfig::new(config.poses.clone())
        .with_hold_secs(config.hold_secs)
        .with_transition_secs(config.transition_secs)
        .with_completion(CompletionPolicy::Loop);

    if let Err(err) = sim.start(sequence) {
        return RoutineScenarioResult {
            summary: RoutineSummary::default(),
            events: Vec::new(),
            violations: vec![format!("session failed to start: {}", err)],
        };
    }

    sim.run_for(config.duration);
    let summary = sim.summary();
    let events = sim.drain_events();
    let violations = check_event_order(&events, &config.poses);

    RoutineScenarioResult {
        summary,
        events,
        violations,
    }
}

/// Ordering rules every event stream must obey
pub fn check_event_order(events: &[EngineEvent], poses: &[PoseId]) -> Vec<String> {
    let mut violations = Vec::new();
    let mut holding = false;
    let mut transitioning = false;
    let mut cursor = 0usize;
    let mut last_remaining: Option<u32> = None;

    for (i, event) in events.iter().enumerate() {
        match event {
            EngineEvent::ConfidenceUpdated { class_id, .. } => {
                if transitioning {
                    violations.push(format!("#{}: confidence update during transition", i));
                }
                if poses.get(cursor) != Some(class_id) {
                    violations.push(format!("#{}: update for {} at cursor {}", i, class_id, cursor));
                }
            }
            EngineEvent::HoldStarted { .. } => {
                if holding || transitioning {
                    violations.push(format!("#{}: hold started twice", i));
                }
                holding = true;
            }
            EngineEvent::HoldReset { .. } => {
                if !holding {
                    violations.push(format!("#{}: reset without hold", i));
                }
                holding = false;
            }
            EngineEvent::HoldCompleted { .. } => {
                if !holding {
                    violations.push(format!("#{}: completed without hold", i));
                }
                holding = false;
                transitioning = true;
                last_remaining = None;
            }
            EngineEvent::TransitionTick { remaining_secs } => {
                if !transitioning {
                    violations.push(format!("#{}: countdown outside transition", i));
                }
                if last_remaining.is_some_and(|prev| *remaining_secs > prev) {
                    violations.push(format!("#{}: countdown went up", i));
                }
                last_remaining = Some(*remaining_secs);
            }
            EngineEvent::PoseAdvanced { new_class_id, cursor: next } => {
                if !transitioning {
                    violations.push(format!("#{}: advanced without transition", i));
                }
                if *next != (cursor + 1) % poses.len().max(1) {
                    violations.push(format!("#{}: cursor jumped {} -> {}", i, cursor, next));
                }
                if poses.get(*next) != Some(new_class_id) {
                    violations.push(format!("#{}: advanced to wrong pose {}", i, new_class_id));
                }
                transitioning = false;
                cursor = *next;
            }
            EngineEvent::SequenceCompleted => {
                let after_wrap = i > 0
                    && matches!(events[i - 1], EngineEvent::PoseAdvanced { cursor: 0, .. });
                if !after_wrap {
                    violations.push(format!("#{}: completion without wrap", i));
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedSampler;
    use poseflow_core::{ConfidenceSample, Timestamp};
    use poseflow_engine::{Phase, PoseEngine};

    fn secs(s: u64) -> Timestamp {
        Timestamp::from_secs(s)
    }

    fn engine(ids: &[u32]) -> PoseEngine {
        let config = SequenceConfig::new(ids.iter().map(|&i| PoseId(i)).collect())
            .with_threshold(0.5)
            .with_hold_secs(3.0)
            .with_transition_secs(3.0);
        PoseEngine::new(&PoseCatalog::yoga(), config).unwrap()
    }

    fn milestones(events: &[EngineEvent]) -> Vec<&EngineEvent> {
        events.iter().filter(|e| e.is_milestone()).collect()
    }

    #[test]
    fn test_single_pose_full_cycle() {
        let mut engine = engine(&[0]);
        let sample = ConfidenceSample::single(PoseId(0), 0.9);

        let mut log = Vec::new();
        for t in 0..=6 {
            log.push(engine.tick(&sample, secs(t)));
        }

        assert!(matches!(log[0][1], EngineEvent::HoldStarted { class_id: PoseId(0) }));
        assert_eq!(milestones(&log[1]).len(), 0);
        assert_eq!(milestones(&log[2]).len(), 0);

        assert_eq!(log[3][1], EngineEvent::HoldCompleted { class_id: PoseId(0) });
        assert_eq!(log[3][2], EngineEvent::TransitionTick { remaining_secs: 3 });
        assert_eq!(log[4], vec![EngineEvent::TransitionTick { remaining_secs: 2 }]);
        assert_eq!(log[5], vec![EngineEvent::TransitionTick { remaining_secs: 1 }]);
        assert_eq!(
            log[6],
            vec![
                EngineEvent::PoseAdvanced { new_class_id: PoseId(0), cursor: 0 },
                EngineEvent::SequenceCompleted,
            ]
        );
        assert_eq!(engine.phase(), Phase::Waiting);
    }

    #[test]
    fn test_hold_reset_and_restart() {
        let mut engine = engine(&[0, 1]);
        let confidences = [0.9, 0.9, 0.3, 0.9, 0.9, 0.9, 0.9];

        let mut log = Vec::new();
        for (t, &c) in confidences.iter().enumerate() {
            let events = engine.tick(&ConfidenceSample::single(PoseId(0), c), secs(t as u64));
            log.push(milestones(&events).into_iter().cloned().collect::<Vec<_>>());
        }

        assert_eq!(log[0], vec![EngineEvent::HoldStarted { class_id: PoseId(0) }]);
        assert_eq!(log[2], vec![EngineEvent::HoldReset { class_id: PoseId(0) }]);
        assert_eq!(log[3], vec![EngineEvent::HoldStarted { class_id: PoseId(0) }]);
        assert!(log[4].is_empty());
        assert!(log[5].is_empty());
        assert_eq!(log[6], vec![EngineEvent::HoldCompleted { class_id: PoseId(0) }]);
    }

    #[test]
    fn test_missing_expected_class() {
        let mut engine = engine(&[2]);
        let sample = ConfidenceSample::from_pairs([(PoseId(0), 0.7), (PoseId(1), 0.3)]);

        let events = engine.tick(&sample, secs(0));
        match &events[..] {
            [EngineEvent::ConfidenceUpdated {
                class_id,
                probability,
                threshold_met,
                ..
            }] => {
                assert_eq!(*class_id, PoseId(2));
                assert_eq!(*probability, 0.0);
                assert!(!threshold_met);
            }
            other => panic!("unexpected events: {:?}", other),
        }
        assert_eq!(engine.phase(), Phase::Waiting);
        assert_eq!(engine.stats().sample_gaps, 1);
    }

    #[test]
    fn test_three_pose_wrap() {
        let mut engine = engine(&[3, 1, 4]);
        let mut completed = 0;
        let mut t = 0;

        for cycle in 0..3 {
            let expected = engine.current_pose().id;
            let sample = ConfidenceSample::single(expected, 0.95);
            // Hold 0..3, countdown 3..6
            for _ in 0..=6 {
                let events = engine.tick(&sample, secs(t));
                completed += events
                    .iter()
                    .filter(|e| **e == EngineEvent::SequenceCompleted)
                    .count();
                t += 1;
            }
            assert_eq!(engine.cursor(), (cycle + 1) % 3);
            // The countdown end and the next hold start share a frame
            t -= 1;
        }

        assert_eq!(engine.cursor(), 0);
        assert_eq!(completed, 1);
        assert_eq!(engine.stats().poses_advanced, 3);
    }

    #[test]
    fn test_stop_while_holding_or_transitioning() {
        let sample = ConfidenceSample::single(PoseId(0), 0.9);

        let mut holding = engine(&[0, 1]);
        holding.tick(&sample, secs(0));
        assert_eq!(holding.phase(), Phase::Holding);
        holding.stop();
        assert_eq!(holding.phase(), Phase::Idle);
        for t in 1..10 {
            assert!(holding.tick(&sample, secs(t)).is_empty());
        }
        assert_eq!(holding.state().hold_started_at, None);

        let mut transitioning = engine(&[0, 1]);
        for t in 0..=4 {
            transitioning.tick(&sample, secs(t));
        }
        assert_eq!(transitioning.phase(), Phase::Transitioning);
        transitioning.stop();
        for t in 5..12 {
            assert!(transitioning.tick(&sample, secs(t)).is_empty());
        }
        assert_eq!(transitioning.cursor(), 0);
        assert_eq!(transitioning.state().transition_started_at, None);
    }

    #[test]
    fn test_scripted_routine_through_session() {
        // Two poses, one frame per second: wobble on the first pose
        let mut frames = Vec::new();
        for c in [0.9, 0.2, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9] {
            frames.push(Some(ConfidenceSample::from_pairs([(PoseId(0), c), (PoseId(1), 0.1)])));
        }
        frames.push(None);
        for _ in 0..5 {
            frames.push(Some(ConfidenceSample::from_pairs([(PoseId(0), 0.1), (PoseId(1), 0.9)])));
        }

        let mut sim = RoutineSimulator::new(
            PoseCatalog::dance(),
            ScriptedSampler::new(frames),
            Duration::from_secs(1),
        );
        let config = SequenceConfig::new(vec![PoseId(0), PoseId(1)])
            .with_hold_secs(2.0)
            .with_transition_secs(2.0);
        sim.start(config).unwrap();
        sim.run_for(Duration::from_secs(14));

        let summary = sim.summary();
        assert_eq!(summary.skipped_frames, 1);
        assert_eq!(summary.holds_reset, 1);
        assert_eq!(summary.holds_completed, 2);
        assert_eq!(summary.poses_advanced, 2);
        assert_eq!(summary.cycles_completed, 1);
        assert!(check_event_order(sim.events(), &[PoseId(0), PoseId(1)]).is_empty());
    }

    #[test]
    fn test_minimal_scenario() {
        let result = run_routine_scenario(&RoutineScenarioConfig::minimal());
        assert!(result.passed(), "violations: {:?}", result.violations);
        assert!(result.count("sequenceCompleted") >= 1);
    }

    #[test]
    fn test_standard_scenario() {
        let result = run_routine_scenario(&RoutineScenarioConfig::standard());
        assert!(result.passed(), "violations: {:?}", result.violations);
        assert_eq!(result.summary.holds_reset, 0);
    }

    #[test]
    fn test_stress_scenario_keeps_order() {
        let result = run_routine_scenario(&RoutineScenarioConfig::stress());
        assert!(result.violations.is_empty(), "violations: {:?}", result.violations);
        assert!(result.summary.sample_gaps > 0);
        assert!(result.summary.skipped_frames > 0);
    }

    #[test]
    fn test_scenario_replay_is_deterministic() {
        let config = RoutineScenarioConfig::standard()
            .with_noise(NoiseConfig::shaky())
            .with_seed(99);
        let a = run_routine_scenario(&config);
        let b = run_routine_scenario(&config);
        assert_eq!(a.events, b.events);
        assert_eq!(a.summary, b.summary);
    }

    #[test]
    fn test_check_event_order_flags_bad_stream() {
        let bad = vec![
            EngineEvent::HoldCompleted { class_id: PoseId(0) },
            EngineEvent::SequenceCompleted,
        ];
        let violations = check_event_order(&bad, &[PoseId(0)]);
        assert_eq!(violations.len(), 2);
    }
}
