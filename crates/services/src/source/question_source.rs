use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{LevelId, QuestionBank};
use storage::QuizPersistence;
use tracing::{debug, info, warn};
use url::Url;

use super::fallback::fallback_bank;
use super::fetcher::Fetcher;
use crate::config::QuizConfig;
use crate::error::FetchError;

/// Where a resolved bank came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankOrigin {
    Network,
    Cache,
    /// Built-in content; the view should flag the remote as unavailable.
    Fallback,
}

/// A bank together with the step of the resolution chain that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBank {
    pub bank: QuestionBank,
    pub origin: BankOrigin,
}

impl ResolvedBank {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.origin == BankOrigin::Fallback
    }
}

/// Resolves a level to a bank: network with retries, then cache, then the
/// built-in fallback.
pub struct QuestionSource {
    fetcher: Arc<dyn Fetcher>,
    persistence: QuizPersistence,
    clock: Clock,
    config: QuizConfig,
}

impl QuestionSource {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        persistence: QuizPersistence,
        clock: Clock,
        config: QuizConfig,
    ) -> Self {
        Self {
            fetcher,
            persistence,
            clock,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Resolve `level` to a bank. Never fails.
    ///
    /// Network banks are written back to the cache before being returned.
    pub async fn fetch_level(&self, level: LevelId) -> ResolvedBank {
        match self.fetch_remote(level).await {
            Ok(bank) => {
                if let Err(err) = self.persistence.cache_bank(level, &bank).await {
                    warn!(level = level.value(), %err, "failed to cache level bank");
                }
                return ResolvedBank {
                    bank,
                    origin: BankOrigin::Network,
                };
            }
            Err(err) => {
                warn!(
                    level = level.value(),
                    attempts = self.config.total_attempts(),
                    %err,
                    "level fetch failed, trying cache"
                );
            }
        }

        match self.persistence.cached_bank(level).await {
            Ok(Some(bank)) => {
                info!(level = level.value(), "using cached level bank");
                return ResolvedBank {
                    bank,
                    origin: BankOrigin::Cache,
                };
            }
            Ok(None) => debug!(level = level.value(), "no cached level bank"),
            Err(err) => warn!(level = level.value(), %err, "cache lookup failed"),
        }

        warn!(level = level.value(), "remote unavailable, using built-in fallback bank");
        ResolvedBank {
            bank: fallback_bank(level),
            origin: BankOrigin::Fallback,
        }
    }

    /// Try the network up to `total_attempts` times with linear backoff.
    async fn fetch_remote(&self, level: LevelId) -> Result<QuestionBank, FetchError> {
        let attempts = self.config.total_attempts();
        let mut attempt = 1;
        loop {
            let url = self.level_url(level, attempt)?;
            debug!(%url, attempt, "fetching level");

            match self.fetch_once(&url).await {
                Ok(bank) => {
                    if bank.level() != level {
                        warn!(
                            requested = level.value(),
                            served = bank.level().value(),
                            "level file reports a different level"
                        );
                        return Ok(bank.relabeled(level));
                    }
                    return Ok(bank);
                }
                Err(err) if attempt < attempts => {
                    warn!(level = level.value(), attempt, %err, "level fetch attempt failed");
                    let backoff = self.config.backoff_step.saturating_mul(attempt);
                    self.clock.delay(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One attempt, raced against the configured timeout.
    ///
    /// Whichever side finishes first wins; the other future is dropped.
    async fn fetch_once(&self, url: &Url) -> Result<QuestionBank, FetchError> {
        let timeout = self.config.fetch_timeout;
        match tokio::time::timeout(timeout, self.fetcher.fetch_bank(url, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    }

    /// Level file URL with a cache-busting query parameter.
    fn level_url(&self, level: LevelId, attempt: u32) -> Result<Url, FetchError> {
        let mut url = self
            .config
            .base_url
            .join(&format!("questions/level{}.json", level.value()))?;
        let stamp = format!("{}-{attempt}", self.clock.now().timestamp_millis());
        url.query_pairs_mut().append_pair("v", &stamp);
        Ok(url)
    }
}
