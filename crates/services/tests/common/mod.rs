#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{LevelId, Question, QuestionBank};
use services::{FetchError, Fetcher};
use url::Url;

/// One scripted answer from `ScriptedFetcher`.
pub enum Reply {
    Bank(QuestionBank),
    Timeout,
    Status(u16),
    Malformed,
    /// Never resolves; only the caller's timeout ends the attempt.
    Hang,
}

/// Fetcher that plays back replies in order and records requested URLs.
#[derive(Default)]
pub struct ScriptedFetcher {
    replies: Mutex<VecDeque<Reply>>,
    urls: Mutex<Vec<Url>>,
}

impl ScriptedFetcher {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<Url> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch_bank(&self, url: &Url, timeout: Duration) -> Result<QuestionBank, FetchError> {
        self.urls.lock().unwrap().push(url.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Bank(bank)) => Ok(bank),
            Some(Reply::Timeout) => Err(FetchError::Timeout(timeout)),
            Some(Reply::Status(code)) => Err(FetchError::HttpStatus(
                reqwest::StatusCode::from_u16(code).unwrap(),
            )),
            Some(Reply::Malformed) => Err(FetchError::Malformed("missing questions".into())),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(FetchError::Transport("no scripted reply".into())),
        }
    }
}

/// Bank of `n` two-option questions; the first option of each is correct.
pub fn bank(level: u32, title: &str, n: usize) -> QuestionBank {
    let questions = (0..n)
        .map(|i| {
            Question::new(
                format!("{title} question {i}"),
                vec![format!("right {i}"), format!("wrong {i}")],
                0,
            )
            .unwrap()
        })
        .collect();
    QuestionBank::new(LevelId::new(level), title, Some(format!("{title} summary")), questions)
}
