//! Practice session - one engine driven by a sampler, a clock and a sink

use std::time::{Duration, Instant};

use poseflow_core::{PoseCatalog, SequenceConfig};
use poseflow_engine::{Clock, EngineStats, Phase, PoseEngine};

use crate::{ConfidenceSampler, EventSink, SessionError, SessionResult, SessionSettings};

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub frames: u64,
    pub skipped_frames: u64,
    pub events_emitted: u64,
    pub last_step_duration: Duration,
}

/// What one `step` did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Engine ticked, emitting this many events
    Ticked(usize),
    /// Sampler had no frame
    Skipped,
    /// No session running
    Stopped,
}

/// A practice session.
///
/// The engine exists only between `start` and `stop`; stopping discards it.
pub struct PracticeSession<S, C, K> {
    catalog: PoseCatalog,
    engine: Option<PoseEngine>,
    sampler: S,
    clock: C,
    sink: K,
    stats: RuntimeStats,
}

impl<S, C, K> PracticeSession<S, C, K>
where
    S: ConfidenceSampler,
    C: Clock,
    K: EventSink,
{
    pub fn new(catalog: PoseCatalog, sampler: S, clock: C, sink: K) -> Self {
        PracticeSession {
            catalog,
            engine: None,
            sampler,
            clock,
            sink,
            stats: RuntimeStats::default(),
        }
    }

    /// Validate `config` and start at the first pose
    pub fn start(&mut self, config: SequenceConfig) -> SessionResult<()> {
        if self.engine.is_some() {
            return Err(SessionError::AlreadyRunning);
        }
        self.engine = Some(PoseEngine::new(&self.catalog, config)?);
        self.stats = RuntimeStats::default();
        Ok(())
    }

    pub fn start_with_settings(&mut self, settings: &SessionSettings) -> SessionResult<()> {
        let config = settings.to_sequence_config(&self.catalog)?;
        self.start(config)
    }

    /// Run one frame through the engine
    pub fn step(&mut self) -> StepOutcome {
        let started = Instant::now();

        let Some(engine) = self.engine.as_mut() else {
            return StepOutcome::Stopped;
        };

        self.stats.frames += 1;

        let Some(sample) = self.sampler.sample() else {
            self.stats.skipped_frames += 1;
            tracing::debug!(frame = self.stats.frames, "No sample for frame, skipping");
            return StepOutcome::Skipped;
        };

        let now = self.clock.now();
        let events = engine.tick(&sample, now);
        for event in &events {
            self.sink.on_event(event);
        }

        self.stats.events_emitted += events.len() as u64;
        self.stats.last_step_duration = started.elapsed();
        StepOutcome::Ticked(events.len())
    }

    /// Stop and discard the engine. Returns its final counters.
    pub fn stop(&mut self) -> Option<EngineStats> {
        let mut engine = self.engine.take()?;
        engine.stop();
        Some(engine.stats().clone())
    }

    /// Back to the first pose. False if no session is running.
    pub fn restart(&mut self) -> bool {
        match self.engine.as_mut() {
            Some(engine) => {
                engine.restart();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_some()
    }

    /// Running session that reached `Completed`
    pub fn is_finished(&self) -> bool {
        self.engine
            .as_ref()
            .map(|e| e.phase() == Phase::Completed)
            .unwrap_or(false)
    }

    pub fn engine(&self) -> Option<&PoseEngine> {
        self.engine.as_ref()
    }

    pub fn catalog(&self) -> &PoseCatalog {
        &self.catalog
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn into_parts(self) -> (S, C, K) {
        (self.sampler, self.clock, self.sink)
    }
}
