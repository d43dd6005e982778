#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod presenter;
pub mod sessions;
pub mod source;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::QuizServices;
pub use config::QuizConfig;
pub use error::{FetchError, QuizServicesError, SessionError};
pub use presenter::{Presenter, PresenterEvent};
pub use sessions::{
    LevelIntro, QuestionView, QuizRunner, SessionEngine, SessionPhase, SessionProgress,
    SessionStep,
};
pub use source::{BankOrigin, Fetcher, HttpFetcher, QuestionSource, ResolvedBank};
