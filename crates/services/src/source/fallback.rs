//! Built-in banks used when neither the network nor the cache has a level.

use quiz_core::model::{LevelId, Question, QuestionBank};
use tracing::error;

struct FallbackQuestion {
    prompt: &'static str,
    options: &'static [&'static str],
    correct: usize,
}

struct FallbackLevel {
    level: u32,
    title: &'static str,
    summary: &'static str,
    questions: &'static [FallbackQuestion],
}

const FALLBACK_LEVELS: &[FallbackLevel] = &[FallbackLevel {
    level: 1,
    title: "Getting Started (offline)",
    summary: "The question server could not be reached, so this short built-in level is shown instead. \
              Your progress is still saved.",
    questions: &[
        FallbackQuestion {
            prompt: "What score do you need to pass a level?",
            options: &["50%", "70%", "90%", "100%"],
            correct: 1,
        },
        FallbackQuestion {
            prompt: "How many questions are drawn for each level?",
            options: &["Up to 5", "Up to 10", "Up to 20", "All of them"],
            correct: 1,
        },
        FallbackQuestion {
            prompt: "What happens to answer choices each time a question is shown?",
            options: &[
                "They are shuffled",
                "They stay in the same order",
                "They are sorted alphabetically",
            ],
            correct: 0,
        },
    ],
}];

/// The built-in bank for `level`: the defined fallback with the greatest
/// level not above `level`, or the first one.
#[must_use]
pub fn fallback_bank(level: LevelId) -> QuestionBank {
    let chosen = FALLBACK_LEVELS
        .iter()
        .filter(|entry| entry.level <= level.value())
        .max_by_key(|entry| entry.level)
        .or_else(|| FALLBACK_LEVELS.first());

    let Some(entry) = chosen else {
        return QuestionBank::new(level, "", None, Vec::new());
    };

    let questions = entry
        .questions
        .iter()
        .filter_map(|q| {
            let options = q.options.iter().map(|o| (*o).to_owned()).collect();
            Question::new(q.prompt, options, q.correct)
                .map_err(|err| error!(%err, prompt = q.prompt, "invalid built-in question"))
                .ok()
        })
        .collect();

    QuestionBank::new(
        LevelId::new(entry.level),
        entry.title,
        Some(entry.summary.to_owned()),
        questions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_question_is_valid() {
        for entry in FALLBACK_LEVELS {
            let bank = fallback_bank(LevelId::new(entry.level));
            assert_eq!(bank.len(), entry.questions.len());
        }
    }

    #[test]
    fn higher_levels_use_nearest_lower_fallback() {
        let bank = fallback_bank(LevelId::new(42));
        assert_eq!(bank.level(), LevelId::FIRST);
        assert!(!bank.is_empty());
        assert!(bank.summary().is_some());
    }
}
