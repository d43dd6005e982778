use std::collections::BTreeMap;

use crate::model::ids::LevelId;

/// Last achieved percent per level.
///
/// Completing a level overwrites its entry; nothing is accumulated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRecord {
    levels: BTreeMap<LevelId, u32>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `percent` for `level`, replacing any earlier value.
    pub fn record(&mut self, level: LevelId, percent: u32) {
        self.levels.insert(level, percent.min(100));
    }

    #[must_use]
    pub fn get(&self, level: LevelId) -> Option<u32> {
        self.levels.get(&level).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Entries in ascending level order.
    pub fn iter(&self) -> impl Iterator<Item = (LevelId, u32)> + '_ {
        self.levels.iter().map(|(level, percent)| (*level, *percent))
    }
}

impl FromIterator<(LevelId, u32)> for ProgressRecord {
    fn from_iter<T: IntoIterator<Item = (LevelId, u32)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (level, percent) in iter {
            record.record(level, percent);
        }
        record
    }
}
