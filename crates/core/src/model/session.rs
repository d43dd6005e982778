use thiserror::Error;

use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question already answered")]
    AlreadyAnswered,

    #[error("option {index} out of range for {len} options")]
    OptionOutOfRange { index: usize, len: usize },
}

/// A question as presented in one session, with its options reordered.
///
/// `correct_index` always points at the option text that was correct in the
/// source question; `selected` is written at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuestion {
    source_index: usize,
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
    selected: Option<usize>,
}

impl SessionQuestion {
    /// Build a session question from `source` with its options laid out in
    /// `order`, where `order[i]` is the source index of the option shown at
    /// position `i`.
    ///
    /// Returns `None` unless `order` is a permutation of the source options.
    #[must_use]
    pub fn from_permutation(source_index: usize, source: &Question, order: &[usize]) -> Option<Self> {
        let len = source.options().len();
        if order.len() != len {
            return None;
        }
        let mut seen = vec![false; len];
        for &idx in order {
            if idx >= len || seen[idx] {
                return None;
            }
            seen[idx] = true;
        }

        let options = order
            .iter()
            .map(|&idx| source.options()[idx].clone())
            .collect();
        let correct_index = order.iter().position(|&idx| idx == source.correct_index())?;

        Some(Self {
            source_index,
            prompt: source.prompt().to_owned(),
            options,
            correct_index,
            selected: None,
        })
    }

    /// Position of the source question inside its bank.
    #[must_use]
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    /// `Some(true)` if the recorded selection is correct, `None` if unanswered.
    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        self.selected.map(|idx| idx == self.correct_index)
    }

    /// Record the user's choice.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::AlreadyAnswered` on a second call and
    /// `AnswerError::OptionOutOfRange` for an index past the options.
    pub fn record_selection(&mut self, index: usize) -> Result<(), AnswerError> {
        if self.selected.is_some() {
            return Err(AnswerError::AlreadyAnswered);
        }
        if index >= self.options.len() {
            return Err(AnswerError::OptionOutOfRange {
                index,
                len: self.options.len(),
            });
        }
        self.selected = Some(index);
        Ok(())
    }
}
