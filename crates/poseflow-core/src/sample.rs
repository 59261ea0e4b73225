//! Per-frame confidence samples
//!
//! A sample is what the pose classifier produced for one frame: a
//! probability per class id. Samples do not need to cover every class,
//! and need not sum to one.

use std::collections::BTreeMap;

use crate::PoseId;

/// A class and its probability
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassScore {
    pub class_id: PoseId,
    pub probability: f32,
}

/// Class id -> probability for one frame.
///
/// Ordered so that iteration, and therefore tie-breaking, is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfidenceSample {
    scores: BTreeMap<PoseId, f32>,
}

impl ConfidenceSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (PoseId, f32)>,
    {
        let mut sample = Self::new();
        for (id, p) in pairs {
            sample.insert(id, p);
        }
        sample
    }

    /// Single-class sample
    pub fn single(id: PoseId, probability: f32) -> Self {
        Self::from_pairs([(id, probability)])
    }

    /// Insert a probability. NaN and negatives become 0, values above 1 become 1.
    pub fn insert(&mut self, id: PoseId, probability: f32) {
        self.scores.insert(id, normalize(probability));
    }

    pub fn probability(&self, id: PoseId) -> Option<f32> {
        self.scores.get(&id).copied()
    }

    /// Highest-probability class; ties go to the lowest id
    pub fn best(&self) -> Option<ClassScore> {
        let mut best: Option<ClassScore> = None;
        for (&class_id, &probability) in &self.scores {
            match best {
                Some(b) if b.probability >= probability => {}
                _ => best = Some(ClassScore { class_id, probability }),
            }
        }
        best
    }

    /// True if `id` is the unique top class
    pub fn is_top_class(&self, id: PoseId) -> bool {
        let Some(p) = self.probability(id) else {
            return false;
        };
        self.scores
            .iter()
            .all(|(&other, &q)| other == id || q < p)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ClassScore> + '_ {
        self.scores.iter().map(|(&class_id, &probability)| ClassScore {
            class_id,
            probability,
        })
    }
}

#[inline]
fn normalize(p: f32) -> f32 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
