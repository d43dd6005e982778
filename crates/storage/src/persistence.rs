//! Typed access to the persisted quiz state.
//!
//! Every value lives in the key/value `Store` under these keys:
//! - `tsaaLevel`: current level, decimal
//! - `tsaaScores`: JSON object `{ "level<N>": percent }`
//! - `tsaaBank:<version>:level<N>`: cached level file JSON
//! - `tsaaName`: player display name

use std::collections::BTreeMap;
use std::sync::Arc;

use quiz_core::model::{LevelId, ProgressRecord, QuestionBank};
use tracing::warn;

use crate::repository::{StorageError, Store};

const LEVEL_KEY: &str = "tsaaLevel";
const SCORES_KEY: &str = "tsaaScores";
const BANK_KEY_PREFIX: &str = "tsaaBank";
const NAME_KEY: &str = "tsaaName";

/// Cache format tag used when none is configured.
pub const DEFAULT_CACHE_VERSION: &str = "v2";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Reads and writes quiz state through a `Store`.
#[derive(Clone)]
pub struct QuizPersistence {
    store: Arc<dyn Store>,
    cache_version: String,
}

impl QuizPersistence {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            cache_version: DEFAULT_CACHE_VERSION.to_owned(),
        }
    }

    /// Use a different cache format tag; banks cached under other tags are ignored.
    #[must_use]
    pub fn with_cache_version(mut self, version: impl Into<String>) -> Self {
        self.cache_version = version.into();
        self
    }

    #[must_use]
    pub fn cache_version(&self) -> &str {
        &self.cache_version
    }

    fn bank_key(&self, level: LevelId) -> String {
        format!("{BANK_KEY_PREFIX}:{}:{}", self.cache_version, level.progress_key())
    }

    /// Level the player is on; missing or unreadable values mean level 1.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn current_level(&self) -> Result<LevelId, StorageError> {
        let Some(raw) = self.store.get(LEVEL_KEY).await? else {
            return Ok(LevelId::FIRST);
        };
        Ok(raw.parse::<LevelId>().unwrap_or_else(|err| {
            warn!(%err, "ignoring unreadable current level");
            LevelId::FIRST
        }))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub async fn set_current_level(&self, level: LevelId) -> Result<(), StorageError> {
        self.store.set(LEVEL_KEY, &level.value().to_string()).await
    }

    /// Stored per-level percentages.
    ///
    /// Older entries may hold fractional percents; they are rounded on read.
    /// A corrupt scores entry reads as empty progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn progress(&self) -> Result<ProgressRecord, StorageError> {
        let Some(raw) = self.store.get(SCORES_KEY).await? else {
            return Ok(ProgressRecord::new());
        };
        let parsed: BTreeMap<String, f64> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(%err, "ignoring corrupt progress entry");
                return Ok(ProgressRecord::new());
            }
        };

        Ok(parsed
            .into_iter()
            .filter_map(|(key, percent)| {
                let level = key.parse::<LevelId>().ok()?;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let percent = percent.clamp(0.0, 100.0).round() as u32;
                Some((level, percent))
            })
            .collect())
    }

    /// Overwrite the stored percent for `level`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or written.
    pub async fn record_progress(&self, level: LevelId, percent: u32) -> Result<(), StorageError> {
        let mut progress = self.progress().await?;
        progress.record(level, percent);

        let encoded: BTreeMap<String, u32> = progress
            .iter()
            .map(|(level, percent)| (level.progress_key(), percent))
            .collect();
        let raw = serde_json::to_string(&encoded).map_err(ser)?;
        self.store.set(SCORES_KEY, &raw).await
    }

    /// Most recent bank cached for `level` under the current cache version.
    ///
    /// An entry that no longer parses is treated as a miss.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn cached_bank(&self, level: LevelId) -> Result<Option<QuestionBank>, StorageError> {
        let Some(raw) = self.store.get(&self.bank_key(level)).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<QuestionBank>(&raw) {
            Ok(bank) => Ok(Some(bank)),
            Err(err) => {
                warn!(level = level.value(), %err, "ignoring unreadable cached bank");
                Ok(None)
            }
        }
    }

    /// Cache `bank` as the latest copy for `level`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub async fn cache_bank(&self, level: LevelId, bank: &QuestionBank) -> Result<(), StorageError> {
        let raw = serde_json::to_string(bank).map_err(ser)?;
        self.store.set(&self.bank_key(level), &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn player_name(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .store
            .get(NAME_KEY)
            .await?
            .filter(|name| !name.trim().is_empty()))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub async fn set_player_name(&self, name: &str) -> Result<(), StorageError> {
        let name = name.trim();
        if name.is_empty() {
            return self.store.remove(NAME_KEY).await;
        }
        self.store.set(NAME_KEY, name).await
    }

    /// Forget everything: progress, current level, cached banks and name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    pub async fn reset(&self) -> Result<(), StorageError> {
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use quiz_core::model::Question;

    fn persistence() -> (InMemoryStore, QuizPersistence) {
        let store = InMemoryStore::new();
        let persistence = QuizPersistence::new(Arc::new(store.clone()));
        (store, persistence)
    }

    fn bank(level: u32) -> QuestionBank {
        QuestionBank::new(
            LevelId::new(level),
            "Cached",
            None,
            vec![Question::new("Q", vec!["a".into(), "b".into()], 1).unwrap()],
        )
    }

    #[tokio::test]
    async fn current_level_defaults_to_first() {
        let (store, persistence) = persistence();
        assert_eq!(persistence.current_level().await.unwrap(), LevelId::FIRST);

        store.set(LEVEL_KEY, "garbage").await.unwrap();
        assert_eq!(persistence.current_level().await.unwrap(), LevelId::FIRST);

        persistence.set_current_level(LevelId::new(4)).await.unwrap();
        assert_eq!(persistence.current_level().await.unwrap(), LevelId::new(4));
        assert_eq!(store.get(LEVEL_KEY).await.unwrap().as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn progress_is_overwritten_per_level() {
        let (store, persistence) = persistence();
        persistence.record_progress(LevelId::new(1), 90).await.unwrap();
        persistence.record_progress(LevelId::new(2), 50).await.unwrap();
        persistence.record_progress(LevelId::new(1), 60).await.unwrap();

        let progress = persistence.progress().await.unwrap();
        assert_eq!(progress.get(LevelId::new(1)), Some(60));
        assert_eq!(progress.get(LevelId::new(2)), Some(50));

        let raw = store.get(SCORES_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"{"level1":60,"level2":50}"#);
    }

    #[tokio::test]
    async fn progress_reads_fractional_legacy_values() {
        let (store, persistence) = persistence();
        store
            .set(SCORES_KEY, r#"{"level3":66.66666666666667,"bogus":12}"#)
            .await
            .unwrap();
        let progress = persistence.progress().await.unwrap();
        assert_eq!(progress.get(LevelId::new(3)), Some(67));
        assert_eq!(progress.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_progress_reads_as_empty() {
        let (store, persistence) = persistence();
        store.set(SCORES_KEY, "{not json").await.unwrap();
        assert!(persistence.progress().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cached_bank_is_scoped_by_cache_version() {
        let (store, persistence) = persistence();
        persistence.cache_bank(LevelId::new(2), &bank(2)).await.unwrap();
        assert_eq!(
            persistence.cached_bank(LevelId::new(2)).await.unwrap(),
            Some(bank(2))
        );
        assert!(store.get("tsaaBank:v2:level2").await.unwrap().is_some());

        let newer = QuizPersistence::new(Arc::new(store.clone())).with_cache_version("v3");
        assert_eq!(newer.cached_bank(LevelId::new(2)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_cached_bank_is_a_miss() {
        let (store, persistence) = persistence();
        store
            .set("tsaaBank:v2:level1", r#"{"level":1,"title":"old format"}"#)
            .await
            .unwrap();
        assert_eq!(persistence.cached_bank(LevelId::new(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn blank_name_clears_entry() {
        let (_store, persistence) = persistence();
        persistence.set_player_name("  Thandi ").await.unwrap();
        assert_eq!(
            persistence.player_name().await.unwrap().as_deref(),
            Some("Thandi")
        );
        persistence.set_player_name("   ").await.unwrap();
        assert_eq!(persistence.player_name().await.unwrap(), None);
    }

    #[tokio::test]
    async fn reset_clears_all_state() {
        let (store, persistence) = persistence();
        persistence.set_current_level(LevelId::new(9)).await.unwrap();
        persistence.record_progress(LevelId::new(8), 100).await.unwrap();
        persistence.cache_bank(LevelId::new(9), &bank(9)).await.unwrap();

        persistence.reset().await.unwrap();

        assert_eq!(store.len().unwrap(), 0);
        assert_eq!(persistence.current_level().await.unwrap(), LevelId::FIRST);
    }
}
