use std::sync::Arc;

use storage::QuizPersistence;
use storage::repository::Storage;

use crate::Clock;
use crate::config::QuizConfig;
use crate::error::QuizServicesError;
use crate::presenter::Presenter;
use crate::sessions::{QuizRunner, SessionEngine};
use crate::source::{Fetcher, HttpFetcher, QuestionSource};

/// Assembles the question source, persistence and session engine.
#[derive(Clone)]
pub struct QuizServices {
    config: QuizConfig,
    persistence: QuizPersistence,
    source: Arc<QuestionSource>,
}

impl QuizServices {
    /// Build services backed by `SQLite` storage and HTTP level files.
    ///
    /// # Errors
    ///
    /// Returns `QuizServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: QuizConfig,
    ) -> Result<Self, QuizServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(storage, Arc::new(HttpFetcher::new()), clock, config))
    }

    #[must_use]
    pub fn new(
        storage: Storage,
        fetcher: Arc<dyn Fetcher>,
        clock: Clock,
        config: QuizConfig,
    ) -> Self {
        let persistence = QuizPersistence::new(Arc::clone(&storage.store))
            .with_cache_version(config.cache_version.clone());
        let source = Arc::new(QuestionSource::new(
            fetcher,
            persistence.clone(),
            clock,
            config.clone(),
        ));
        Self {
            config,
            persistence,
            source,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn persistence(&self) -> &QuizPersistence {
        &self.persistence
    }

    #[must_use]
    pub fn question_source(&self) -> Arc<QuestionSource> {
        Arc::clone(&self.source)
    }

    /// A fresh engine sized by the configured session size.
    #[must_use]
    pub fn session_engine(&self) -> SessionEngine {
        SessionEngine::new(Arc::clone(&self.source), self.persistence.clone())
            .with_session_size(self.config.session_size)
    }

    #[must_use]
    pub fn runner<P: Presenter>(&self, presenter: P) -> QuizRunner<P> {
        QuizRunner::new(self.session_engine(), self.persistence.clone(), presenter)
    }
}
