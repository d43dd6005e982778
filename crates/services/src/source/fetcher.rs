use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::QuestionBank;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// Retrieves a level file from wherever level files are served.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch and parse the bank at `url`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` for transport failures, non-success statuses,
    /// timeouts and level files that do not parse.
    async fn fetch_bank(&self, url: &Url, timeout: Duration) -> Result<QuestionBank, FetchError>;
}

/// `Fetcher` over HTTP(S) using `reqwest`.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_bank(&self, url: &Url, timeout: Duration) -> Result<QuestionBank, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| classify(err, timeout))?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "level response");
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }

        let body = response.text().await.map_err(|err| classify(err, timeout))?;
        parse_bank(&body)
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout)
    } else {
        FetchError::Http(err)
    }
}

/// Parse a level file body.
///
/// # Errors
///
/// Returns `FetchError::Malformed` when the JSON is invalid, `questions` is
/// missing, or a question breaks the option/correct-index rules.
pub fn parse_bank(body: &str) -> Result<QuestionBank, FetchError> {
    serde_json::from_str(body).map_err(|err| FetchError::Malformed(err.to_string()))
}
