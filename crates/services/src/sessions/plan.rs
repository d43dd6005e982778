use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{QuestionBank, SessionQuestion};
use quiz_core::scoring::SESSION_SIZE;

/// Questions selected for one session, already answer-shuffled.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<SessionQuestion>,
}

impl SessionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Samples a session from a bank.
///
/// Both the question subset and each question's option order come from
/// Fisher-Yates shuffles, so every subset and every ordering is equally likely.
pub struct SessionBuilder<'a> {
    bank: &'a QuestionBank,
    size: usize,
}

impl<'a> SessionBuilder<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self {
            bank,
            size: SESSION_SIZE,
        }
    }

    /// Cap on sampled questions; the session holds `min(size, bank.len())`.
    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> SessionPlan {
        let source = self.bank.questions();
        let mut picks: Vec<usize> = (0..source.len()).collect();
        picks.shuffle(rng);
        picks.truncate(self.size.min(source.len()));

        let questions = picks
            .into_iter()
            .filter_map(|idx| {
                let question = &source[idx];
                let mut order: Vec<usize> = (0..question.options().len()).collect();
                order.shuffle(rng);
                // `order` is a shuffled identity, so this always succeeds.
                SessionQuestion::from_permutation(idx, question, &order)
            })
            .collect();

        SessionPlan { questions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{LevelId, Question};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn bank(n: usize) -> QuestionBank {
        let questions = (0..n)
            .map(|i| {
                Question::new(
                    format!("Q{i}"),
                    vec![format!("right{i}"), format!("w{i}a"), format!("w{i}b"), format!("w{i}c")],
                    0,
                )
                .unwrap()
            })
            .collect();
        QuestionBank::new(LevelId::new(1), "T", None, questions)
    }

    #[test]
    fn samples_at_most_session_size_without_duplicates() {
        let bank = bank(25);
        let mut rng = StdRng::seed_from_u64(7);
        let plan = SessionBuilder::new(&bank).build(&mut rng);

        assert_eq!(plan.total(), 10);
        let unique: HashSet<_> = plan.questions.iter().map(SessionQuestion::source_index).collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn small_bank_uses_every_question() {
        let bank = bank(3);
        let mut rng = StdRng::seed_from_u64(1);
        let plan = SessionBuilder::new(&bank).with_size(10).build(&mut rng);

        let mut sources: Vec<_> = plan.questions.iter().map(SessionQuestion::source_index).collect();
        sources.sort_unstable();
        assert_eq!(sources, vec![0, 1, 2]);
    }

    #[test]
    fn empty_bank_yields_empty_plan() {
        let bank = bank(0);
        let plan = SessionBuilder::new(&bank).build(&mut StdRng::seed_from_u64(3));
        assert!(plan.is_empty());
    }

    #[test]
    fn shuffled_options_keep_correct_text_and_multiset() {
        let bank = bank(12);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = SessionBuilder::new(&bank).build(&mut rng);
            for q in &plan.questions {
                let source = &bank.questions()[q.source_index()];
                assert_eq!(q.options()[q.correct_index()], source.correct_text());

                let mut shown = q.options().to_vec();
                let mut original = source.options().to_vec();
                shown.sort();
                original.sort();
                assert_eq!(shown, original);
            }
        }
    }

    #[test]
    fn every_question_can_be_selected() {
        let bank = bank(15);
        let mut seen = HashSet::new();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let plan = SessionBuilder::new(&bank).build(&mut rng);
            seen.extend(plan.questions.iter().map(SessionQuestion::source_index));
        }
        assert_eq!(seen.len(), 15);
    }

    #[test]
    fn correct_option_lands_in_every_position() {
        let bank = bank(1);
        let mut positions = HashSet::new();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let plan = SessionBuilder::new(&bank).build(&mut rng);
            positions.insert(plan.questions[0].correct_index());
        }
        assert_eq!(positions.len(), 4);
    }
}
