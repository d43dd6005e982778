mod ids;
mod progress;
mod question;
mod session;

pub use ids::{LevelId, ParseLevelIdError};
pub use progress::ProgressRecord;
pub use question::{Question, QuestionBank, QuestionError};
pub use session::{AnswerError, SessionQuestion};
