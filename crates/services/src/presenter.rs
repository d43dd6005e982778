//! Boundary between the session engine and whatever draws the quiz.

use async_trait::async_trait;
use quiz_core::scoring::LevelResult;

use crate::sessions::{LevelIntro, QuestionView};

/// Input coming back from the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterEvent {
    /// Leave the level summary and show the first question.
    Begin,
    OptionSelected(usize),
    /// Score the current answer and move to the next question.
    Advance,
    NextLevel,
    /// Clear all progress and start again from level 1.
    Restart,
    Quit,
}

/// View layer driven by `QuizRunner`.
#[async_trait]
pub trait Presenter: Send {
    /// Show the level heading and summary. Degraded intros come from built-in
    /// content and should say the remote is unavailable.
    async fn render_summary(&mut self, intro: &LevelIntro);

    async fn render_question(&mut self, view: &QuestionView);

    async fn render_result(&mut self, result: &LevelResult);

    async fn prompt_volunteer(&mut self);

    /// Wait for the next user action.
    async fn next_event(&mut self) -> PresenterEvent;
}
