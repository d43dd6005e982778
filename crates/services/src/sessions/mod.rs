mod engine;
mod plan;
mod progress;
mod runner;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use engine::{
    LevelIntro, LoadTicket, QuestionView, SessionEngine, SessionPhase, SessionStep,
};
pub use plan::{SessionBuilder, SessionPlan};
pub use progress::SessionProgress;
pub use runner::QuizRunner;
