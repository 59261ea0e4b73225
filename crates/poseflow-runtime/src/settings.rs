//! Practice settings as saved by the host
//!
//! Poses are stored by label so a settings file survives catalog id
//! changes. Stored as JSON.

use std::fs;
use std::path::Path;

use poseflow_core::{CompletionPolicy, MatchRule, PoseCatalog, SequenceConfig, ThresholdMode};
use serde::{Deserialize, Serialize};

use crate::SessionResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Pose labels in practice order
    pub poses: Vec<String>,
    pub accuracy_threshold: f32,
    pub hold_seconds: f64,
    pub transition_seconds: f64,
    pub threshold_mode: ThresholdMode,
    pub match_rule: MatchRule,
    pub completion: CompletionPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            poses: Vec::new(),
            accuracy_threshold: SequenceConfig::DEFAULT_THRESHOLD,
            hold_seconds: SequenceConfig::DEFAULT_HOLD_SECS,
            transition_seconds: SequenceConfig::DEFAULT_TRANSITION_SECS,
            threshold_mode: ThresholdMode::default(),
            match_rule: MatchRule::default(),
            completion: CompletionPolicy::default(),
        }
    }
}

impl SessionSettings {
    pub fn load(path: impl AsRef<Path>) -> SessionResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SessionResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> SessionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolve labels against `catalog` and build a validated config
    pub fn to_sequence_config(&self, catalog: &PoseCatalog) -> SessionResult<SequenceConfig> {
        let active_ids = catalog.resolve_labels(&self.poses)?;
        let config = SequenceConfig::new(active_ids)
            .with_threshold(self.accuracy_threshold)
            .with_hold_secs(self.hold_seconds)
            .with_transition_secs(self.transition_seconds)
            .with_threshold_mode(self.threshold_mode)
            .with_match_rule(self.match_rule)
            .with_completion(self.completion);
        config.validate_against(catalog)?;
        Ok(config)
    }
}
