//! Confidence samplers
//!
//! A sampler stands for camera + pose classifier: each call produces the
//! confidences for the latest frame, or `None` when no usable frame or
//! prediction was available. A `None` frame is skipped, not ticked.

use poseflow_core::{ConfidenceSample, PoseCatalog};

pub trait ConfidenceSampler {
    fn sample(&mut self) -> Option<ConfidenceSample>;
}

impl<F> ConfidenceSampler for F
where
    F: FnMut() -> Option<ConfidenceSample>,
{
    fn sample(&mut self) -> Option<ConfidenceSample> {
        self()
    }
}

/// Adapts a classifier that reports `(label, probability)` pairs, the way
/// browser pose models name their classes
pub struct LabelledSampler<F> {
    catalog: PoseCatalog,
    predict: F,
}

impl<F> LabelledSampler<F>
where
    F: FnMut() -> Option<Vec<(String, f32)>>,
{
    pub fn new(catalog: PoseCatalog, predict: F) -> Self {
        LabelledSampler { catalog, predict }
    }

    pub fn catalog(&self) -> &PoseCatalog {
        &self.catalog
    }
}

impl<F> ConfidenceSampler for LabelledSampler<F>
where
    F: FnMut() -> Option<Vec<(String, f32)>>,
{
    fn sample(&mut self) -> Option<ConfidenceSample> {
        let predictions = (self.predict)()?;
        Some(self.catalog.sample_from_labels(&predictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poseflow_core::PoseId;

    #[test]
    fn test_closure_sampler() {
        let mut calls = 0;
        let mut sampler = || {
            calls += 1;
            (calls % 2 == 0).then(|| ConfidenceSample::single(PoseId(0), 0.8))
        };

        assert!(sampler.sample().is_none());
        assert_eq!(
            sampler.sample().and_then(|s| s.probability(PoseId(0))),
            Some(0.8)
        );
    }

    #[test]
    fn test_labelled_sampler() {
        let mut sampler = LabelledSampler::new(PoseCatalog::dance(), || {
            Some(vec![
                ("Pose1".to_string(), 0.1),
                ("Pose2".to_string(), 0.85),
                ("Background".to_string(), 0.05),
            ])
        });

        let sample = sampler.sample().unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample.best().map(|b| b.class_id), Some(PoseId(1)));
        assert_eq!(sampler.catalog().len(), 3);
    }
}
