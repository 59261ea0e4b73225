//! Pose catalog and sequence selection
//!
//! The catalog is the fixed set of poses the classifier knows about.
//! A practice sequence is an ordered selection of catalog ids, where a
//! pose may appear more than once and slots can be switched off without
//! losing their place.

use std::collections::HashSet;

use crate::{ConfidenceSample, ConfigResult, ConfigurationError, PoseId};

/// A catalog pose: model class id plus display label
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PoseCatalogEntry {
    pub id: PoseId,
    pub label: String,
}

impl PoseCatalogEntry {
    pub fn new(id: impl Into<PoseId>, label: impl Into<String>) -> Self {
        PoseCatalogEntry {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Immutable, ordered pose catalog with unique ids and labels
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoseCatalog {
    entries: Vec<PoseCatalogEntry>,
}

impl PoseCatalog {
    /// Build a catalog, rejecting duplicate ids or labels
    pub fn new(entries: Vec<PoseCatalogEntry>) -> ConfigResult<Self> {
        let mut ids = HashSet::new();
        let mut labels = HashSet::new();

        for entry in &entries {
            if !ids.insert(entry.id) {
                return Err(ConfigurationError::DuplicateCatalogId(entry.id));
            }
            if !labels.insert(entry.label.as_str()) {
                return Err(ConfigurationError::DuplicateCatalogLabel(entry.label.clone()));
            }
        }

        Ok(PoseCatalog { entries })
    }

    /// The three-class dance game catalog
    pub fn dance() -> Self {
        PoseCatalog {
            entries: vec![
                PoseCatalogEntry::new(0, "Pose1"),
                PoseCatalogEntry::new(1, "Pose2"),
                PoseCatalogEntry::new(2, "Pose3"),
            ],
        }
    }

    /// Yoga session catalog
    pub fn yoga() -> Self {
        let labels = [
            "Mountain",
            "Tree",
            "Warrior I",
            "Warrior II",
            "Triangle",
            "Downward Dog",
            "Cobra",
            "Child's Pose",
        ];

        PoseCatalog {
            entries: labels
                .iter()
                .enumerate()
                .map(|(i, label)| PoseCatalogEntry::new(i as u32, *label))
                .collect(),
        }
    }

    pub fn get(&self, id: PoseId) -> Option<&PoseCatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: PoseId) -> bool {
        self.get(id).is_some()
    }

    /// Look up by label: exact match first, then ASCII case-insensitive
    pub fn by_label(&self, label: &str) -> Option<&PoseCatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|e| e.label.eq_ignore_ascii_case(label))
            })
    }

    pub fn entries(&self) -> &[PoseCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a list of labels into ids, keeping their order
    pub fn resolve_labels<S: AsRef<str>>(&self, labels: &[S]) -> ConfigResult<Vec<PoseId>> {
        labels
            .iter()
            .map(|label| {
                self.by_label(label.as_ref())
                    .map(|e| e.id)
                    .ok_or_else(|| ConfigurationError::UnknownLabel(label.as_ref().to_string()))
            })
            .collect()
    }

    /// Build a sample from labelled model predictions.
    /// Labels the catalog does not know are skipped.
    pub fn sample_from_labels<S: AsRef<str>>(&self, predictions: &[(S, f32)]) -> ConfidenceSample {
        let mut sample = ConfidenceSample::new();
        for (label, probability) in predictions {
            match self.by_label(label.as_ref()) {
                Some(entry) => sample.insert(entry.id, *probability),
                None => tracing::debug!("Ignoring prediction for unknown class {:?}", label.as_ref()),
            }
        }
        sample
    }
}

/// One slot of a selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionSlot {
    pub id: PoseId,
    pub enabled: bool,
}

/// Ordered, toggleable selection of catalog poses
#[derive(Clone, Debug)]
pub struct SequenceSelection<'a> {
    catalog: &'a PoseCatalog,
    slots: Vec<SelectionSlot>,
}

impl<'a> SequenceSelection<'a> {
    pub fn new(catalog: &'a PoseCatalog) -> Self {
        SequenceSelection {
            catalog,
            slots: Vec::new(),
        }
    }

    /// Append a pose in selection order. Selecting again adds another slot.
    pub fn select(&mut self, id: PoseId) -> ConfigResult<&mut Self> {
        if !self.catalog.contains(id) {
            return Err(ConfigurationError::UnknownPose(id));
        }
        self.slots.push(SelectionSlot { id, enabled: true });
        Ok(self)
    }

    /// Append every catalog pose in catalog order
    pub fn select_all(&mut self) -> &mut Self {
        self.slots.extend(self.catalog.entries().iter().map(|e| SelectionSlot {
            id: e.id,
            enabled: true,
        }));
        self
    }

    /// Enable every slot holding `id`
    pub fn enable(&mut self, id: PoseId) -> &mut Self {
        self.set_enabled(id, true);
        self
    }

    /// Disable every slot holding `id`; slots keep their position
    pub fn disable(&mut self, id: PoseId) -> &mut Self {
        self.set_enabled(id, false);
        self
    }

    fn set_enabled(&mut self, id: PoseId, enabled: bool) {
        for slot in self.slots.iter_mut().filter(|s| s.id == id) {
            slot.enabled = enabled;
        }
    }

    pub fn slots(&self) -> &[SelectionSlot] {
        &self.slots
    }

    /// Enabled ids in selection order
    pub fn active_ids(&self) -> Vec<PoseId> {
        self.slots
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.id)
            .collect()
    }
}
