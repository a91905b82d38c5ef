use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::super::domain::LearnerAggregate;

/// Unlock condition of a badge, validated when the badge table is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "snake_case")]
pub enum BadgeRequirement {
    Lessons(u64),
    Coins(u64),
    Streak(u32),
    Langs(u64),
    /// Number of perfect attempts across all languages.
    Perfect(u64),
}

impl BadgeRequirement {
    pub fn is_met(&self, aggregate: &LearnerAggregate) -> bool {
        match *self {
            BadgeRequirement::Lessons(threshold) => aggregate.completed_lesson_count >= threshold,
            BadgeRequirement::Coins(threshold) => aggregate.coins >= threshold,
            BadgeRequirement::Streak(threshold) => aggregate.streak_days >= threshold,
            BadgeRequirement::Langs(threshold) => {
                aggregate.studied_languages.len() as u64 >= threshold
            }
            BadgeRequirement::Perfect(threshold) => aggregate.perfect_score_count >= threshold,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BadgeRequirement::Lessons(_) => "lessons",
            BadgeRequirement::Coins(_) => "coins",
            BadgeRequirement::Streak(_) => "streak",
            BadgeRequirement::Langs(_) => "langs",
            BadgeRequirement::Perfect(_) => "perfect",
        }
    }

    fn threshold(&self) -> u64 {
        match *self {
            BadgeRequirement::Lessons(value)
            | BadgeRequirement::Coins(value)
            | BadgeRequirement::Langs(value)
            | BadgeRequirement::Perfect(value) => value,
            BadgeRequirement::Streak(value) => u64::from(value),
        }
    }
}

impl fmt::Display for BadgeRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.threshold())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementError {
    #[error("requirement is empty")]
    Empty,
    #[error("unknown requirement kind '{0}'")]
    UnknownKind(String),
    #[error("requirement '{0}' needs a threshold")]
    MissingThreshold(String),
    #[error("invalid threshold '{0}'")]
    InvalidThreshold(String),
}

/// Parses the `kind:threshold` notation, e.g. `lessons:3` or `coins:3000`.
/// A bare `perfect` means one perfect attempt.
impl FromStr for BadgeRequirement {
    type Err = RequirementError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RequirementError::Empty);
        }

        let (kind, threshold) = match raw.split_once(':') {
            Some((kind, threshold)) => (kind.trim().to_ascii_lowercase(), Some(threshold.trim())),
            None => (raw.to_ascii_lowercase(), None),
        };

        let threshold = match (kind.as_str(), threshold) {
            ("perfect", None) => return Ok(BadgeRequirement::Perfect(1)),
            ("lessons" | "coins" | "streak" | "langs" | "perfect", None) => {
                return Err(RequirementError::MissingThreshold(raw.to_string()))
            }
            (_, Some(value)) => value,
            (_, None) => return Err(RequirementError::UnknownKind(kind.clone())),
        };

        let parse = |value: &str| {
            value
                .parse::<u64>()
                .map_err(|_| RequirementError::InvalidThreshold(value.to_string()))
        };

        match kind.as_str() {
            "lessons" => Ok(BadgeRequirement::Lessons(parse(threshold)?)),
            "coins" => Ok(BadgeRequirement::Coins(parse(threshold)?)),
            "streak" => threshold
                .parse::<u32>()
                .map(BadgeRequirement::Streak)
                .map_err(|_| RequirementError::InvalidThreshold(threshold.to_string())),
            "langs" => Ok(BadgeRequirement::Langs(parse(threshold)?)),
            "perfect" => Ok(BadgeRequirement::Perfect(parse(threshold)?)),
            _ => Err(RequirementError::UnknownKind(kind.clone())),
        }
    }
}
