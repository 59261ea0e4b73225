//! Pose Engine - the progression state machine
//!
//! Ticked once per frame with the frame's confidence sample and a
//! timestamp. Drives the hold and transition timers, moves the sequence
//! cursor and reports every decision as an `EngineEvent`.
//!
//! ```text
//! Waiting --met--> Holding --held long enough--> Transitioning --countdown done--> Waiting
//!    ^                |                                                  |
//!    +----missed------+                         (StopAtEnd, wrapped) ---> Completed
//! ```

use std::time::Duration;

use poseflow_core::{
    CompletionPolicy, ConfidenceSample, ConfigResult, EngineEvent, MatchRule, PoseCatalog,
    PoseCatalogEntry, PoseId, SampleGapWarning, SequenceConfig, Timestamp,
};

use crate::{HoldTimer, PoseSequence, TransitionTimer};

/// Engine phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Stopped; ticks are ignored
    Idle,
    /// Waiting for the expected pose to reach the threshold
    Waiting,
    /// Expected pose held, hold timer running
    Holding,
    /// Hold complete, countdown to the next pose
    Transitioning,
    /// Sequence finished under `CompletionPolicy::StopAtEnd`
    Completed,
}

/// Snapshot of the engine's mutable state.
///
/// INVARIANTS:
/// - `hold_started_at.is_some()` iff `phase == Holding`
/// - `transition_started_at.is_some()` iff `phase == Transitioning`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineState {
    pub cursor: usize,
    pub phase: Phase,
    pub hold_started_at: Option<Timestamp>,
    pub transition_started_at: Option<Timestamp>,
    pub last_confidence: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ticks: u64,
    pub sample_gaps: u64,
    /// Runs of consecutive gaps for the same pose
    pub gap_runs: u64,
    pub holds_started: u64,
    pub holds_reset: u64,
    pub holds_completed: u64,
    pub poses_advanced: u64,
    pub cycles_completed: u64,
}

/// Progression state machine for one practice session
pub struct PoseEngine {
    config: SequenceConfig,
    sequence: PoseSequence,
    hold: HoldTimer,
    transition: TransitionTimer,
    transition_duration: Duration,
    phase: Phase,
    last_confidence: f32,
    last_sample_gap: Option<SampleGapWarning>,
    /// Pose missing from the previous frame, if it was
    gap_run: Option<PoseId>,
    stats: EngineStats,
}

impl PoseEngine {
    /// Validate `config` against `catalog` and start a session at the first pose
    pub fn new(catalog: &PoseCatalog, config: SequenceConfig) -> ConfigResult<Self> {
        config.validate_against(catalog)?;
        let hold_duration = config.hold_duration()?;
        let transition_duration = config.transition_duration()?;
        let sequence = PoseSequence::new(catalog, &config.active_ids)?;

        tracing::info!(
            poses = sequence.len(),
            threshold = config.accuracy_threshold,
            hold_secs = config.hold_duration_secs,
            transition_secs = config.transition_duration_secs,
            "Pose session started"
        );

        Ok(PoseEngine {
            hold: HoldTimer::new(hold_duration),
            transition: TransitionTimer::new(),
            transition_duration,
            sequence,
            config,
            phase: Phase::Waiting,
            last_confidence: 0.0,
            last_sample_gap: None,
            gap_run: None,
            stats: EngineStats::default(),
        })
    }

    /// Process one frame. Never fails; a sample without the expected pose
    /// counts as zero confidence.
    pub fn tick(&mut self, sample: &ConfidenceSample, now: Timestamp) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        match self.phase {
            Phase::Idle | Phase::Completed => return events,
            Phase::Waiting | Phase::Holding => {
                self.stats.ticks += 1;
                self.tick_hold(sample, now, &mut events);
            }
            Phase::Transitioning => {
                self.stats.ticks += 1;
                self.tick_transition(now, &mut events);
            }
        }

        events
    }

    fn tick_hold(&mut self, sample: &ConfidenceSample, now: Timestamp, events: &mut Vec<EngineEvent>) {
        let expected = self.sequence.current().id;

        let (confidence, threshold_met) = match sample.probability(expected) {
            Some(p) => {
                self.gap_run = None;
                let met = self.config.threshold_met(p)
                    && match self.config.match_rule {
                        MatchRule::ExpectedClass => true,
                        MatchRule::TopClass => sample.is_top_class(expected),
                    };
                (p, met)
            }
            None => {
                self.record_gap(expected, now);
                (0.0, false)
            }
        };
        self.last_confidence = confidence;

        let progress = self.hold.update(threshold_met, now);

        events.push(EngineEvent::ConfidenceUpdated {
            class_id: expected,
            probability: confidence,
            threshold_met,
            hold_remaining_secs: progress.remaining_secs(),
            best: sample.best(),
        });

        let phase = self.phase;
        match phase {
            Phase::Waiting if progress.started => {
                self.set_phase(Phase::Holding);
                self.stats.holds_started += 1;
                events.push(EngineEvent::HoldStarted { class_id: expected });
            }
            Phase::Holding if !progress.holding => {
                self.set_phase(Phase::Waiting);
                self.stats.holds_reset += 1;
                events.push(EngineEvent::HoldReset { class_id: expected });
            }
            Phase::Holding if progress.is_complete() => {
                self.complete_hold(expected, now, events);
            }
            _ => {}
        }
    }

    fn complete_hold(&mut self, class_id: PoseId, now: Timestamp, events: &mut Vec<EngineEvent>) {
        self.hold.reset();
        self.transition.start(now);
        self.set_phase(Phase::Transitioning);
        self.stats.holds_completed += 1;
        events.push(EngineEvent::HoldCompleted { class_id });

        // The countdown starts on the completing frame
        self.tick_transition(now, events);
    }

    fn tick_transition(&mut self, now: Timestamp, events: &mut Vec<EngineEvent>) {
        let progress = self
            .transition
            .tick(now, self.transition_duration);

        if !progress.done {
            events.push(EngineEvent::TransitionTick {
                remaining_secs: progress.remaining_secs,
            });
            return;
        }

        self.transition.reset();
        let next = self.sequence.next_index();
        let wrapped = self.sequence.move_to(next);
        self.stats.poses_advanced += 1;

        let entry = self.sequence.current();
        tracing::info!(cursor = next, pose = %entry.label, "Advanced to next pose");
        events.push(EngineEvent::PoseAdvanced {
            new_class_id: entry.id,
            cursor: next,
        });

        if wrapped {
            self.stats.cycles_completed += 1;
            tracing::info!(cycles = self.stats.cycles_completed, "Pose sequence completed");
            events.push(EngineEvent::SequenceCompleted);

            if self.config.completion == CompletionPolicy::StopAtEnd {
                self.set_phase(Phase::Completed);
                return;
            }
        }

        self.set_phase(Phase::Waiting);
    }

    fn record_gap(&mut self, class_id: PoseId, at: Timestamp) {
        let gap = SampleGapWarning { class_id, at };
        if self.gap_run == Some(class_id) {
            tracing::debug!("{}", gap);
        } else {
            tracing::warn!("{}", gap);
            self.stats.gap_runs += 1;
            self.gap_run = Some(class_id);
        }
        self.stats.sample_gaps += 1;
        self.last_sample_gap = Some(gap);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, cursor = self.sequence.cursor(), "Phase change");
            self.phase = phase;
        }
    }

    /// Stop the session. Drops running timers; emits nothing.
    pub fn stop(&mut self) {
        self.hold.reset();
        self.transition.reset();
        self.set_phase(Phase::Idle);
        tracing::info!("Pose session stopped");
    }

    /// Back to the first pose, waiting
    pub fn restart(&mut self) {
        self.hold.reset();
        self.transition.reset();
        self.sequence.reset();
        self.last_confidence = 0.0;
        self.gap_run = None;
        self.set_phase(Phase::Waiting);
        tracing::info!("Pose session restarted");
    }

    pub fn state(&self) -> EngineState {
        EngineState {
            cursor: self.sequence.cursor(),
            phase: self.phase,
            hold_started_at: self.hold.started_at(),
            transition_started_at: self.transition.started_at(),
            last_confidence: self.last_confidence,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.sequence.cursor()
    }

    /// Pose the engine currently expects
    pub fn current_pose(&self) -> &PoseCatalogEntry {
        self.sequence.current()
    }

    pub fn sequence(&self) -> &PoseSequence {
        &self.sequence
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn last_sample_gap(&self) -> Option<SampleGapWarning> {
        self.last_sample_gap
    }
}
