use std::fmt;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use quiz_core::model::{LevelId, SessionQuestion};
use quiz_core::scoring::{LevelResult, SESSION_SIZE};
use storage::QuizPersistence;

use super::plan::SessionBuilder;
use super::progress::SessionProgress;
use crate::error::SessionError;
use crate::source::{BankOrigin, QuestionSource, ResolvedBank};

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Where the engine is in the level lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    LevelLoading(LevelId),
    /// Bank loaded and summary shown; questions not started.
    LevelReady,
    InQuestion(usize),
    Answered(usize),
    LevelComplete,
}

/// Handle for one level load; only the most recent ticket can install a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    level: LevelId,
    generation: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn level(&self) -> LevelId {
        self.level
    }
}

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// What the presenter shows before the first question.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelIntro {
    pub level: LevelId,
    pub heading: String,
    pub summary: Option<String>,
    pub origin: BankOrigin,
    pub question_count: usize,
}

impl LevelIntro {
    /// True when the bank is built-in content rather than the real level.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.origin == BankOrigin::Fallback
    }
}

/// A question ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub question: SessionQuestion,
    pub progress: SessionProgress,
}

/// Result of moving the session forward.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStep {
    Question(QuestionView),
    Complete(LevelResult),
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

struct SessionState {
    level: LevelId,
    origin: BankOrigin,
    questions: Vec<SessionQuestion>,
    current: usize,
    score: usize,
}

impl SessionState {
    fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        SessionProgress {
            total,
            answered: self.questions.iter().filter(|q| q.is_answered()).count(),
            remaining: total.saturating_sub(self.current),
            position: self.current.min(total.saturating_sub(1)),
            score: self.score,
        }
    }

    /// View of the question at `current`.
    fn current_view(&self) -> Option<QuestionView> {
        self.questions.get(self.current).map(|question| QuestionView {
            index: self.current,
            total: self.questions.len(),
            question: question.clone(),
            progress: self.progress(),
        })
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Owns the per-level session: sampling, answering, scoring and progress.
///
/// All session state is private; callers drive it only through the
/// operations below, each of which checks the current phase.
pub struct SessionEngine {
    source: Arc<QuestionSource>,
    persistence: QuizPersistence,
    session_size: usize,
    rng: StdRng,
    phase: SessionPhase,
    generation: u64,
    state: Option<SessionState>,
    result: Option<LevelResult>,
}

impl SessionEngine {
    #[must_use]
    pub fn new(source: Arc<QuestionSource>, persistence: QuizPersistence) -> Self {
        Self {
            source,
            persistence,
            session_size: SESSION_SIZE,
            rng: StdRng::from_os_rng(),
            phase: SessionPhase::Idle,
            generation: 0,
            state: None,
            result: None,
        }
    }

    #[must_use]
    pub fn with_session_size(mut self, size: usize) -> Self {
        self.session_size = size.max(1);
        self
    }

    /// Use a seeded generator so sampling is reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Level of the session being loaded or played.
    #[must_use]
    pub fn level(&self) -> Option<LevelId> {
        match self.phase {
            SessionPhase::LevelLoading(level) => Some(level),
            _ => self.state.as_ref().map(|state| state.level),
        }
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.state.as_ref().map_or(0, |state| state.score)
    }

    #[must_use]
    pub fn result(&self) -> Option<&LevelResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&SessionQuestion> {
        match self.phase {
            SessionPhase::InQuestion(i) | SessionPhase::Answered(i) => {
                self.state.as_ref().and_then(|state| state.questions.get(i))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.state.as_ref().map(SessionState::progress)
    }

    /// Enter `LevelLoading` for `level`, superseding any load in flight.
    pub fn begin_load(&mut self, level: LevelId) -> LoadTicket {
        self.generation += 1;
        self.phase = SessionPhase::LevelLoading(level);
        self.state = None;
        self.result = None;
        debug!(level = level.value(), generation = self.generation, "level load started");
        LoadTicket {
            level,
            generation: self.generation,
        }
    }

    /// Build the session for a finished load.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleLoad` if another load began after `ticket`
    /// was issued; the bank is discarded.
    pub fn install_bank(
        &mut self,
        ticket: LoadTicket,
        resolved: ResolvedBank,
    ) -> Result<LevelIntro, SessionError> {
        if ticket.generation != self.generation
            || self.phase != SessionPhase::LevelLoading(ticket.level)
        {
            info!(level = ticket.level.value(), "discarding superseded level load");
            return Err(SessionError::StaleLoad {
                level: ticket.level,
            });
        }

        let ResolvedBank { bank, origin } = resolved;
        let bank = bank.relabeled(ticket.level);
        let plan = SessionBuilder::new(&bank)
            .with_size(self.session_size)
            .build(&mut self.rng);

        let intro = LevelIntro {
            level: ticket.level,
            heading: bank.heading(),
            summary: bank.summary().map(str::to_owned),
            origin,
            question_count: plan.total(),
        };

        info!(
            level = ticket.level.value(),
            bank_size = bank.len(),
            sampled = plan.total(),
            ?origin,
            "level ready"
        );

        self.state = Some(SessionState {
            level: ticket.level,
            origin,
            questions: plan.questions,
            current: 0,
            score: 0,
        });
        self.phase = SessionPhase::LevelReady;
        Ok(intro)
    }

    /// Load `level` from the question source and prepare its session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleLoad` only if the load was superseded.
    pub async fn start_level(&mut self, level: LevelId) -> Result<LevelIntro, SessionError> {
        let ticket = self.begin_load(level);
        let resolved = self.source.fetch_level(level).await;
        self.install_bank(ticket, resolved)
    }

    /// Show the first question. An empty session completes immediately.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless the level is ready.
    pub async fn begin_questions(&mut self) -> Result<SessionStep, SessionError> {
        if self.phase != SessionPhase::LevelReady {
            return Err(SessionError::InvalidState(self.phase));
        }
        let first = self.state.as_ref().and_then(SessionState::current_view);
        match first {
            Some(view) => {
                self.phase = SessionPhase::InQuestion(0);
                Ok(SessionStep::Question(view))
            }
            None => Ok(SessionStep::Complete(self.complete_level().await)),
        }
    }

    /// Record the answer for the current question without scoring it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyAnswered` on a repeat answer,
    /// `SessionError::OptionOutOfRange` for a bad index, and
    /// `SessionError::InvalidState` outside a question.
    pub fn submit_answer(&mut self, option: usize) -> Result<(), SessionError> {
        let index = match self.phase {
            SessionPhase::InQuestion(i) => i,
            SessionPhase::Answered(_) => return Err(SessionError::AlreadyAnswered),
            phase => return Err(SessionError::InvalidState(phase)),
        };
        let question = self
            .state
            .as_mut()
            .and_then(|state| state.questions.get_mut(index))
            .ok_or(SessionError::InvalidState(self.phase))?;

        question.record_selection(option)?;
        self.phase = SessionPhase::Answered(index);
        Ok(())
    }

    /// Score the answered question and move on.
    ///
    /// Completes the level after the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAnswered` if the current question has no
    /// answer yet, or `SessionError::InvalidState` outside a question.
    pub async fn advance(&mut self) -> Result<SessionStep, SessionError> {
        let index = match self.phase {
            SessionPhase::Answered(i) => i,
            SessionPhase::InQuestion(_) => return Err(SessionError::NotAnswered),
            phase => return Err(SessionError::InvalidState(phase)),
        };
        let state = self
            .state
            .as_mut()
            .ok_or(SessionError::InvalidState(self.phase))?;

        if state.questions.get(index).and_then(SessionQuestion::is_correct) == Some(true) {
            state.score += 1;
        }
        state.current = index + 1;

        match state.current_view() {
            Some(view) => {
                self.phase = SessionPhase::InQuestion(view.index);
                Ok(SessionStep::Question(view))
            }
            None => Ok(SessionStep::Complete(self.complete_level().await)),
        }
    }

    /// Evaluate the session and store its percent.
    ///
    /// Sessions played from the built-in fallback bank never unlock the next
    /// level. A failed progress write is logged; the result is still returned.
    async fn complete_level(&mut self) -> LevelResult {
        let (level, origin, score, total) = self.state.as_ref().map_or(
            (LevelId::FIRST, BankOrigin::Network, 0, 0),
            |state| (state.level, state.origin, state.score, state.questions.len()),
        );
        let mut result = LevelResult::evaluate(level, score, total);
        if origin == BankOrigin::Fallback && result.next_level.take().is_some() {
            info!(level = level.value(), "offline practice does not unlock the next level");
        }

        if let Err(err) = self
            .persistence
            .record_progress(level, result.display_percent())
            .await
        {
            warn!(level = level.value(), %err, "failed to store level progress");
        }

        info!(
            level = level.value(),
            score = result.score,
            total = result.total,
            percent = result.display_percent(),
            passed = result.passed,
            "level complete"
        );

        self.phase = SessionPhase::LevelComplete;
        self.result = Some(result.clone());
        result
    }

    /// Follow the "next level" affordance of a passed level.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoNextLevel` unless the level is complete,
    /// passed, and below the last level.
    pub async fn advance_to_next_level(&mut self) -> Result<LevelIntro, SessionError> {
        if self.phase != SessionPhase::LevelComplete {
            return Err(SessionError::InvalidState(self.phase));
        }
        let next = self
            .result
            .as_ref()
            .and_then(|result| result.next_level)
            .ok_or(SessionError::NoNextLevel)?;

        if let Err(err) = self.persistence.set_current_level(next).await {
            warn!(level = next.value(), %err, "failed to store current level");
        }
        self.start_level(next).await
    }

    /// Forget all persisted state and start over at level 1.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleLoad` only if the load was superseded.
    pub async fn restart(&mut self) -> Result<LevelIntro, SessionError> {
        if let Err(err) = self.persistence.reset().await {
            warn!(%err, "failed to clear stored quiz state");
        }
        self.start_level(LevelId::FIRST).await
    }
}

impl fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEngine")
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("level", &self.level())
            .field("score", &self.score())
            .field("session_size", &self.session_size)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
