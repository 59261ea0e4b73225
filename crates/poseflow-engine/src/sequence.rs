//! Pose sequence store - the ordered poses of a session and its cursor

use poseflow_core::{ConfigResult, ConfigurationError, PoseCatalog, PoseCatalogEntry, PoseId};

/// Resolved practice sequence.
/// INVARIANT: never empty, `cursor < len()`
#[derive(Clone, Debug)]
pub struct PoseSequence {
    entries: Vec<PoseCatalogEntry>,
    cursor: usize,
    advances: u64,
}

impl PoseSequence {
    /// Resolve `active_ids` against the catalog
    pub fn new(catalog: &PoseCatalog, active_ids: &[PoseId]) -> ConfigResult<Self> {
        if active_ids.is_empty() {
            return Err(ConfigurationError::EmptySequence);
        }

        let entries = active_ids
            .iter()
            .map(|id| {
                catalog
                    .get(*id)
                    .cloned()
                    .ok_or(ConfigurationError::UnknownPose(*id))
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(PoseSequence {
            entries,
            cursor: 0,
            advances: 0,
        })
    }

    /// Entry at the cursor
    pub fn current(&self) -> &PoseCatalogEntry {
        &self.entries[self.cursor]
    }

    /// Index after the cursor, wrapping to 0. Does not move the cursor.
    #[inline]
    pub fn next_index(&self) -> usize {
        (self.cursor + 1) % self.entries.len()
    }

    /// Move the cursor. Returns true if this completed a full cycle.
    pub fn move_to(&mut self, index: usize) -> bool {
        debug_assert!(index < self.entries.len());
        self.cursor = index % self.entries.len();
        self.advances += 1;
        self.cursor == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of cursor moves since the last reset
    pub fn advances(&self) -> u64 {
        self.advances
    }

    pub fn entry_at(&self, index: usize) -> Option<&PoseCatalogEntry> {
        self.entries.get(index)
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

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.advances = 0;
    }
}
