//! Test samplers
//!
//! - `ScriptedSampler`: replays a fixed list of frames
//! - `NoisySampler`: a seeded performer following the expected pose

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use poseflow_core::{ConfidenceSample, PoseId};
use poseflow_runtime::ConfidenceSampler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Replays frames in order; `None` frames are lost frames.
/// Returns `None` once the script is exhausted.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSampler {
    frames: VecDeque<Option<ConfidenceSample>>,
}

impl ScriptedSampler {
    pub fn new(frames: Vec<Option<ConfidenceSample>>) -> Self {
        ScriptedSampler {
            frames: frames.into(),
        }
    }

    /// One frame per confidence, all for `class`
    pub fn confidences(class: PoseId, confidences: &[f32]) -> Self {
        Self::new(
            confidences
                .iter()
                .map(|&c| Some(ConfidenceSample::single(class, c)))
                .collect(),
        )
    }

    pub fn push(&mut self, frame: Option<ConfidenceSample>) {
        self.frames.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl ConfidenceSampler for ScriptedSampler {
    fn sample(&mut self) -> Option<ConfidenceSample> {
        self.frames.pop_front().flatten()
    }
}

/// Shared handle to the pose a simulated performer is attempting
pub type TargetHandle = Rc<Cell<PoseId>>;

/// Noise model for a simulated performer
#[derive(Clone, Debug)]
pub struct NoiseConfig {
    /// Mean confidence for the attempted pose
    pub level: f32,
    /// Uniform jitter amplitude around `level`
    pub jitter: f32,
    /// Chance a frame omits the attempted pose
    pub class_dropout: f64,
    /// Chance a frame is lost entirely
    pub frame_loss: f64,
}

impl NoiseConfig {
    /// Steady performer, nothing lost
    pub fn steady() -> Self {
        NoiseConfig {
            level: 0.9,
            jitter: 0.05,
            class_dropout: 0.0,
            frame_loss: 0.0,
        }
    }

    /// Wobbly performer near the threshold
    pub fn shaky() -> Self {
        NoiseConfig {
            level: 0.55,
            jitter: 0.2,
            class_dropout: 0.02,
            frame_loss: 0.02,
        }
    }

    /// Unreliable classifier
    pub fn lossy() -> Self {
        NoiseConfig {
            level: 0.85,
            jitter: 0.1,
            class_dropout: 0.01,
            frame_loss: 0.1,
        }
    }
}

/// Seeded performer: puts `level ± jitter` on the target pose and spreads
/// the rest over the other classes
pub struct NoisySampler {
    config: NoiseConfig,
    classes: Vec<PoseId>,
    target: TargetHandle,
    rng: StdRng,
    dropouts: u64,
    lost: u64,
}

impl NoisySampler {
    pub fn new(config: NoiseConfig, classes: Vec<PoseId>, target: TargetHandle, seed: u64) -> Self {
        NoisySampler {
            config,
            classes,
            target,
            rng: StdRng::seed_from_u64(seed),
            dropouts: 0,
            lost: 0,
        }
    }

    pub fn dropouts(&self) -> u64 {
        self.dropouts
    }

    pub fn lost_frames(&self) -> u64 {
        self.lost
    }
}

impl ConfidenceSampler for NoisySampler {
    fn sample(&mut self) -> Option<ConfidenceSample> {
        if self.config.frame_loss > 0.0 && self.rng.gen_bool(self.config.frame_loss.min(1.0)) {
            self.lost += 1;
            return None;
        }

        let target = self.target.get();
        let jitter = if self.config.jitter > 0.0 {
            self.rng.gen_range(-self.config.jitter..=self.config.jitter)
        } else {
            0.0
        };
        let confidence = (self.config.level + jitter).clamp(0.0, 1.0);
        let drop_target =
            self.config.class_dropout > 0.0 && self.rng.gen_bool(self.config.class_dropout.min(1.0));
        if drop_target {
            self.dropouts += 1;
        }

        let others = self.classes.iter().filter(|&&c| c != target).count().max(1);
        let rest = (1.0 - confidence) / others as f32;

        let mut sample = ConfidenceSample::new();
        for &class in &self.classes {
            if class == target {
                if !drop_target {
                    sample.insert(class, confidence);
                }
            } else {
                sample.insert(class, rest);
            }
        }
        Some(sample)
    }
}
