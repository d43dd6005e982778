use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scoring::TOTAL_LEVELS;

/// Identifier for a quiz level (1-based).
///
/// Zero is normalized to the first level, matching how a missing or blank
/// persisted level is treated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct LevelId(u32);

impl LevelId {
    /// The first level of the quiz.
    pub const FIRST: LevelId = LevelId(1);

    /// Creates a new `LevelId`
    #[must_use]
    pub const fn new(id: u32) -> Self {
        if id == 0 { Self::FIRST } else { Self(id) }
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Returns the following level, or `None` at `TOTAL_LEVELS`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        (self.0 < TOTAL_LEVELS).then(|| Self(self.0 + 1))
    }

    /// Key used for this level in the persisted progress map (`level<N>`).
    #[must_use]
    pub fn progress_key(&self) -> String {
        format!("level{}", self.0)
    }
}

impl Default for LevelId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl From<u32> for LevelId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<LevelId> for u32 {
    fn from(value: LevelId) -> Self {
        value.0
    }
}

impl fmt::Debug for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelId({})", self.0)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing a `LevelId` from text fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelIdError {
    raw: String,
}

impl fmt::Display for ParseLevelIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid level: {}", self.raw)
    }
}

impl std::error::Error for ParseLevelIdError {}

impl FromStr for LevelId {
    type Err = ParseLevelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix("level").unwrap_or(trimmed);
        trimmed
            .parse::<u32>()
            .map(Self::new)
            .map_err(|_| ParseLevelIdError { raw: s.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_normalizes_to_first_level() {
        assert_eq!(LevelId::new(0), LevelId::FIRST);
        assert_eq!(LevelId::new(0).value(), 1);
    }

    #[test]
    fn next_stops_at_total_levels() {
        assert_eq!(LevelId::new(1).next(), Some(LevelId::new(2)));
        assert_eq!(LevelId::new(TOTAL_LEVELS - 1).next(), Some(LevelId::new(TOTAL_LEVELS)));
        assert_eq!(LevelId::new(TOTAL_LEVELS).next(), None);
    }

    #[test]
    fn parses_plain_and_prefixed_forms() {
        assert_eq!("7".parse::<LevelId>().unwrap(), LevelId::new(7));
        assert_eq!("level12".parse::<LevelId>().unwrap(), LevelId::new(12));
        assert_eq!(" 3 ".parse::<LevelId>().unwrap(), LevelId::new(3));
        assert!("abc".parse::<LevelId>().is_err());
        assert!("-1".parse::<LevelId>().is_err());
    }

    #[test]
    fn progress_key_uses_level_prefix() {
        assert_eq!(LevelId::new(4).progress_key(), "level4");
    }
}
