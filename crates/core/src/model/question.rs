use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::LevelId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least 2 options, got {len}")]
    TooFewOptions { len: usize },

    #[error("correct index {index} out of range for {len} options")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question as it appears in a level file.
///
/// Invariant: `options.len() >= 2` and `correct_index < options.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QuestionDraft")]
pub struct Question {
    question: String,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, there are fewer than two
    /// options, or `correct_index` does not point at one of them.
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions { len: options.len() });
        }
        if correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                len: options.len(),
            });
        }
        Ok(Self {
            question,
            options,
            correct_index,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Text of the correct option.
    #[must_use]
    pub fn correct_text(&self) -> &str {
        &self.options[self.correct_index]
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDraft {
    question: String,
    options: Vec<String>,
    correct_index: usize,
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        Self::new(draft.question, draft.options, draft.correct_index)
    }
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

/// The full question pool for one level, exactly as served by the level file.
///
/// Banks are immutable once built; the session samples from them without
/// modifying them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default)]
    level: LevelId,
    #[serde(default)]
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    questions: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(
        level: LevelId,
        title: impl Into<String>,
        summary: Option<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            summary: summary.filter(|s| !s.trim().is_empty()),
            questions,
        }
    }

    #[must_use]
    pub fn level(&self) -> LevelId {
        self.level
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref().filter(|s| !s.trim().is_empty())
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Heading shown above the level, e.g. `Level 3: Local Government`.
    #[must_use]
    pub fn heading(&self) -> String {
        if self.title.trim().is_empty() {
            format!("Level {}", self.level)
        } else {
            format!("Level {}: {}", self.level, self.title)
        }
    }

    /// Returns the same bank labelled as `level`.
    #[must_use]
    pub fn relabeled(mut self, level: LevelId) -> Self {
        self.level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn question_rejects_out_of_range_correct_index() {
        let err = Question::new("Q", opts(&["a", "b"]), 2).unwrap_err();
        assert_eq!(err, QuestionError::CorrectIndexOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn question_rejects_single_option() {
        let err = Question::new("Q", opts(&["only"]), 0).unwrap_err();
        assert_eq!(err, QuestionError::TooFewOptions { len: 1 });
    }

    #[test]
    fn bank_parses_level_file_format() {
        let raw = r#"{
            "level": 2,
            "title": "Civics",
            "summary": "About the assembly.",
            "questions": [
                { "question": "Q1", "options": ["a", "b", "c"], "correctIndex": 1 }
            ]
        }"#;
        let bank: QuestionBank = serde_json::from_str(raw).unwrap();
        assert_eq!(bank.level(), LevelId::new(2));
        assert_eq!(bank.title(), "Civics");
        assert_eq!(bank.summary(), Some("About the assembly."));
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions()[0].correct_text(), "b");
        assert_eq!(bank.heading(), "Level 2: Civics");
    }

    #[test]
    fn bank_without_questions_is_malformed() {
        let raw = r#"{ "level": 1, "title": "T" }"#;
        assert!(serde_json::from_str::<QuestionBank>(raw).is_err());
    }

    #[test]
    fn question_missing_correct_index_is_malformed() {
        let raw = r#"{ "level": 1, "questions": [ { "question": "Q", "options": ["a", "b"] } ] }"#;
        assert!(serde_json::from_str::<QuestionBank>(raw).is_err());
    }

    #[test]
    fn question_with_bad_index_is_malformed() {
        let raw = r#"{ "level": 1, "questions": [ { "question": "Q", "options": ["a", "b"], "correctIndex": 5 } ] }"#;
        let err = serde_json::from_str::<QuestionBank>(raw).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn empty_question_list_is_accepted() {
        let raw = r#"{ "level": 4, "questions": [] }"#;
        let bank: QuestionBank = serde_json::from_str(raw).unwrap();
        assert!(bank.is_empty());
        assert_eq!(bank.heading(), "Level 4");
    }

    #[test]
    fn serialized_bank_uses_level_file_field_names() {
        let bank = QuestionBank::new(
            LevelId::new(1),
            "T",
            None,
            vec![Question::new("Q", opts(&["a", "b"]), 0).unwrap()],
        );
        let json = serde_json::to_value(&bank).unwrap();
        assert_eq!(json["questions"][0]["correctIndex"], 0);
        assert!(json.get("summary").is_none());
        let back: QuestionBank = serde_json::from_value(json).unwrap();
        assert_eq!(back, bank);
    }
}
