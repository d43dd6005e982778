//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use quiz_core::model::{AnswerError, LevelId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::sessions::SessionPhase;

/// Errors from a single attempt to fetch a level file.
///
/// All variants are retried the same way and end in the cache/fallback path;
/// none of them reach the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("level request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("level request timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("level request failed: {0}")]
    Transport(String),
    #[error("level file is malformed: {0}")]
    Malformed(String),
    #[error("invalid level url: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors emitted by the session engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("operation not allowed in phase {0:?}")]
    InvalidState(SessionPhase),
    #[error("question already answered")]
    AlreadyAnswered,
    #[error("current question has not been answered")]
    NotAnswered,
    #[error("option {index} out of range for {len} options")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("load of level {level} was superseded")]
    StaleLoad { level: LevelId },
    #[error("no next level available")]
    NoNextLevel,
}

impl From<AnswerError> for SessionError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::OptionOutOfRange { index, len } => Self::OptionOutOfRange { index, len },
            _ => Self::AlreadyAnswered,
        }
    }
}

/// Errors emitted while bootstrapping quiz services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
