//! Sequence configuration
//!
//! Validated once when a practice session starts. The engine reads it but
//! never changes it.

use std::time::Duration;

use crate::{ConfigResult, ConfigurationError, PoseCatalog, PoseId};

/// Comparison used to decide whether a confidence meets the threshold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThresholdMode {
    /// `confidence >= threshold`
    #[default]
    Inclusive,
    /// `confidence > threshold`
    Exclusive,
}

impl ThresholdMode {
    #[inline]
    pub fn is_met(self, confidence: f32, threshold: f32) -> bool {
        match self {
            ThresholdMode::Inclusive => confidence >= threshold,
            ThresholdMode::Exclusive => confidence > threshold,
        }
    }
}

/// Which classes take part in the threshold decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchRule {
    /// Only the expected pose's confidence is compared
    #[default]
    ExpectedClass,
    /// The expected pose must also be the frame's top class
    TopClass,
}

/// What happens after the last pose of the sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CompletionPolicy {
    /// Wrap to the first pose and keep going
    #[default]
    Loop,
    /// Enter `Completed` until restarted
    StopAtEnd,
}

/// Practice sequence configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceConfig {
    /// Ordered pose ids; repeats are distinct slots
    pub active_ids: Vec<PoseId>,
    /// Minimum confidence in [0, 1]
    pub accuracy_threshold: f32,
    /// Continuous hold required per pose
    pub hold_duration_secs: f64,
    /// Pause between a completed hold and the next pose
    pub transition_duration_secs: f64,
    pub threshold_mode: ThresholdMode,
    pub match_rule: MatchRule,
    pub completion: CompletionPolicy,
}

impl SequenceConfig {
    pub const DEFAULT_THRESHOLD: f32 = 0.5;
    pub const DEFAULT_HOLD_SECS: f64 = 3.0;
    pub const DEFAULT_TRANSITION_SECS: f64 = 3.0;

    /// Config with default threshold and durations
    pub fn new(active_ids: Vec<PoseId>) -> Self {
        SequenceConfig {
            active_ids,
            accuracy_threshold: Self::DEFAULT_THRESHOLD,
            hold_duration_secs: Self::DEFAULT_HOLD_SECS,
            transition_duration_secs: Self::DEFAULT_TRANSITION_SECS,
            threshold_mode: ThresholdMode::default(),
            match_rule: MatchRule::default(),
            completion: CompletionPolicy::default(),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.accuracy_threshold = threshold;
        self
    }

    pub fn with_hold_secs(mut self, secs: f64) -> Self {
        self.hold_duration_secs = secs;
        self
    }

    pub fn with_transition_secs(mut self, secs: f64) -> Self {
        self.transition_duration_secs = secs;
        self
    }

    pub fn with_threshold_mode(mut self, mode: ThresholdMode) -> Self {
        self.threshold_mode = mode;
        self
    }

    pub fn with_match_rule(mut self, rule: MatchRule) -> Self {
        self.match_rule = rule;
        self
    }

    pub fn with_completion(mut self, completion: CompletionPolicy) -> Self {
        self.completion = completion;
        self
    }

    /// Check ranges. Does not look at the catalog.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.active_ids.is_empty() {
            return Err(ConfigurationError::EmptySequence);
        }
        if !(0.0..=1.0).contains(&self.accuracy_threshold) {
            return Err(ConfigurationError::ThresholdOutOfRange(self.accuracy_threshold));
        }
        self.hold_duration()?;
        self.transition_duration()?;
        Ok(())
    }

    /// Range checks plus catalog membership of every active id
    pub fn validate_against(&self, catalog: &PoseCatalog) -> ConfigResult<()> {
        self.validate()?;
        match self.active_ids.iter().find(|id| !catalog.contains(**id)) {
            Some(id) => Err(ConfigurationError::UnknownPose(*id)),
            None => Ok(()),
        }
    }

    /// Hold duration; must be finite, positive and fit a `Duration`
    pub fn hold_duration(&self) -> ConfigResult<Duration> {
        let secs = self.hold_duration_secs;
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ConfigurationError::NonPositiveHold(secs));
        }
        Duration::try_from_secs_f64(secs).map_err(|_| ConfigurationError::DurationTooLong(secs))
    }

    /// Transition duration; must be finite, non-negative and fit a `Duration`
    pub fn transition_duration(&self) -> ConfigResult<Duration> {
        let secs = self.transition_duration_secs;
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigurationError::NegativeTransition(secs));
        }
        Duration::try_from_secs_f64(secs).map_err(|_| ConfigurationError::DurationTooLong(secs))
    }

    #[inline]
    pub fn threshold_met(&self, confidence: f32) -> bool {
        self.threshold_mode.is_met(confidence, self.accuracy_threshold)
    }
}
