use tracing::{debug, warn};

use quiz_core::model::LevelId;
use quiz_core::scoring::LevelResult;
use storage::QuizPersistence;

use super::engine::{LevelIntro, SessionEngine, SessionStep};
use crate::error::SessionError;
use crate::presenter::{Presenter, PresenterEvent};

/// Drives a `SessionEngine` from presenter events until the player quits.
pub struct QuizRunner<P> {
    engine: SessionEngine,
    persistence: QuizPersistence,
    presenter: P,
    last_result: Option<LevelResult>,
}

impl<P: Presenter> QuizRunner<P> {
    #[must_use]
    pub fn new(engine: SessionEngine, persistence: QuizPersistence, presenter: P) -> Self {
        Self {
            engine,
            persistence,
            presenter,
            last_result: None,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    #[must_use]
    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Play from the persisted current level until `Quit`.
    ///
    /// Returns the last level result, if any level was finished.
    pub async fn run(&mut self) -> Option<LevelResult> {
        let level = self.persistence.current_level().await.unwrap_or_else(|err| {
            warn!(%err, "could not read current level, starting at level 1");
            LevelId::FIRST
        });
        self.run_from(level).await
    }

    /// Play starting at `level` until `Quit`.
    pub async fn run_from(&mut self, level: LevelId) -> Option<LevelResult> {
        let started = self.engine.start_level(level).await;
        self.show_intro(started).await;

        loop {
            let event = self.presenter.next_event().await;
            debug!(?event, phase = ?self.engine.phase(), "presenter event");
            match event {
                PresenterEvent::Quit => return self.last_result.clone(),
                PresenterEvent::Begin => {
                    let step = self.engine.begin_questions().await;
                    self.show_step(step).await;
                }
                PresenterEvent::OptionSelected(option) => {
                    if let Err(err) = self.engine.submit_answer(option) {
                        ignored(&err);
                    }
                }
                PresenterEvent::Advance => {
                    let step = self.engine.advance().await;
                    self.show_step(step).await;
                }
                PresenterEvent::NextLevel => {
                    let started = self.engine.advance_to_next_level().await;
                    self.show_intro(started).await;
                }
                PresenterEvent::Restart => {
                    let started = self.engine.restart().await;
                    self.show_intro(started).await;
                }
            }
        }
    }

    async fn show_intro(&mut self, started: Result<LevelIntro, SessionError>) {
        match started {
            Ok(intro) => self.presenter.render_summary(&intro).await,
            Err(err) => ignored(&err),
        }
    }

    async fn show_step(&mut self, step: Result<SessionStep, SessionError>) {
        match step {
            Ok(SessionStep::Question(view)) => self.presenter.render_question(&view).await,
            Ok(SessionStep::Complete(result)) => {
                self.presenter.render_result(&result).await;
                if result.volunteer_eligible {
                    self.presenter.prompt_volunteer().await;
                }
                self.last_result = Some(result);
            }
            Err(err) => ignored(&err),
        }
    }
}

fn ignored(err: &SessionError) {
    match err {
        SessionError::StaleLoad { .. } => debug!(%err, "ignoring superseded load"),
        _ => warn!(%err, "ignoring presenter action"),
    }
}
