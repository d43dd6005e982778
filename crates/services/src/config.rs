use std::env;
use std::time::Duration;

use quiz_core::scoring::SESSION_SIZE;
use storage::persistence::DEFAULT_CACHE_VERSION;
use tracing::warn;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

/// Runtime knobs for loading levels and building sessions.
#[derive(Clone, Debug)]
pub struct QuizConfig {
    /// Root the level files hang off: `{base_url}questions/level<N>.json`.
    pub base_url: Url,
    /// Per-attempt fetch timeout.
    pub fetch_timeout: Duration,
    /// Attempts after the first one.
    pub fetch_retries: u32,
    /// Backoff before attempt `n + 1` is `backoff_step * n`.
    pub backoff_step: Duration,
    pub session_size: usize,
    pub cache_version: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fetch_timeout: Duration::from_millis(7000),
            fetch_retries: 2,
            backoff_step: Duration::from_millis(300),
            session_size: SESSION_SIZE,
            cache_version: DEFAULT_CACHE_VERSION.to_owned(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url is valid")
}

impl QuizConfig {
    /// Read overrides from `QUIZ_*` environment variables.
    ///
    /// Unparseable values are logged and the default is kept.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var("QUIZ_BASE_URL") {
            match config.clone().with_base_url(&raw) {
                Ok(updated) => config = updated,
                Err(err) => warn!(value = %raw, %err, "ignoring QUIZ_BASE_URL"),
            }
        }
        if let Some(ms) = env_number::<u64>("QUIZ_FETCH_TIMEOUT_MS") {
            config.fetch_timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = env_number::<u32>("QUIZ_FETCH_RETRIES") {
            config.fetch_retries = retries;
        }
        if let Some(ms) = env_number::<u64>("QUIZ_BACKOFF_MS") {
            config.backoff_step = Duration::from_millis(ms);
        }
        if let Some(size) = env_number::<usize>("QUIZ_SESSION_SIZE") {
            config.session_size = size.max(1);
        }
        if let Ok(version) = env::var("QUIZ_CACHE_VERSION") {
            if !version.trim().is_empty() {
                config.cache_version = version.trim().to_owned();
            }
        }

        config
    }

    /// Set the base URL; a trailing slash is added so level paths join under it.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `raw` is not an absolute URL.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, url::ParseError> {
        let trimmed = raw.trim();
        let normalized = if trimmed.ends_with('/') {
            trimmed.to_owned()
        } else {
            format!("{trimmed}/")
        };
        self.base_url = Url::parse(&normalized)?;
        Ok(self)
    }

    /// Total network attempts per level load.
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.fetch_retries.saturating_add(1)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring non-numeric setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_retry_policy() {
        let config = QuizConfig::default();
        assert_eq!(config.fetch_timeout, Duration::from_millis(7000));
        assert_eq!(config.total_attempts(), 3);
        assert_eq!(config.backoff_step, Duration::from_millis(300));
        assert_eq!(config.session_size, 10);
        assert_eq!(config.cache_version, "v2");
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = QuizConfig::default()
            .with_base_url("https://example.org/The-Quiz-Staging")
            .unwrap();
        assert_eq!(config.base_url.as_str(), "https://example.org/The-Quiz-Staging/");
    }

    #[test]
    fn relative_base_url_is_rejected() {
        assert!(QuizConfig::default().with_base_url("questions/").is_err());
    }
}
