use crate::model::LevelId;

/// Minimum percent needed to pass a level.
pub const PASSING_SCORE: f64 = 70.0;

/// Percent at which the player is invited to volunteer.
pub const VOLUNTEER_TRIGGER: f64 = 80.0;

/// Number of levels in the quiz.
pub const TOTAL_LEVELS: u32 = 100;

/// Maximum number of questions sampled per session.
pub const SESSION_SIZE: usize = 10;

/// Score ratio scaled to 0-100.
///
/// Threshold checks use the exact value; only display uses the rounded one,
/// so both always derive from the same ratio.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(f64);

impl Percent {
    /// Percent for `score` correct answers out of `total`.
    ///
    /// A zero `total` is treated as one so an empty session scores 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_score(score: usize, total: usize) -> Self {
        let total = total.max(1);
        let score = score.min(total);
        Self(100.0 * score as f64 / total as f64)
    }

    #[must_use]
    pub fn exact(self) -> f64 {
        self.0
    }

    /// Rounded to the nearest whole percent for display and progress storage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded(self) -> u32 {
        self.0.round() as u32
    }

    #[must_use]
    pub fn is_passing(self) -> bool {
        self.0 >= PASSING_SCORE
    }

    #[must_use]
    pub fn is_volunteer_eligible(self) -> bool {
        self.0 >= VOLUNTEER_TRIGGER
    }
}

/// Feedback tier shown with a level result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Excellent,
    Passed,
    KeepGoing,
}

impl Feedback {
    #[must_use]
    pub fn from_percent(percent: Percent) -> Self {
        if percent.exact() >= 90.0 {
            Self::Excellent
        } else if percent.is_passing() {
            Self::Passed
        } else {
            Self::KeepGoing
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Feedback::Excellent => "Excellent! You've mastered this level.",
            Feedback::Passed => "Great job! You passed this level.",
            Feedback::KeepGoing => "Keep going! Try again for a higher score.",
        }
    }
}

/// Outcome of a completed level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelResult {
    pub level: LevelId,
    pub score: usize,
    pub total: usize,
    pub percent: Percent,
    pub passed: bool,
    pub volunteer_eligible: bool,
    pub feedback: Feedback,
    /// Level offered by the "next level" affordance, if any.
    pub next_level: Option<LevelId>,
}

impl LevelResult {
    /// Evaluate a finished session.
    ///
    /// `total` is the session length; an empty session counts as length one.
    #[must_use]
    pub fn evaluate(level: LevelId, score: usize, total: usize) -> Self {
        let total = total.max(1);
        let percent = Percent::from_score(score, total);
        let passed = percent.is_passing();
        Self {
            level,
            score: score.min(total),
            total,
            percent,
            passed,
            volunteer_eligible: percent.is_volunteer_eligible(),
            feedback: Feedback::from_percent(percent),
            next_level: if passed { level.next() } else { None },
        }
    }

    /// Rounded percent for display.
    #[must_use]
    pub fn display_percent(&self) -> u32 {
        self.percent.rounded()
    }
}
