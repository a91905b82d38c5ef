use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for a learner profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileId(pub String);

/// Identifier of a studied language (`es`, `fr`, `pt-br`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguageId(pub String);

/// Lesson identifier, unique within one language's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LessonId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BadgeId(pub String);

macro_rules! string_id {
    ($($name:ident),+) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl $name {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }
        )+
    };
}

string_id!(ProfileId, LanguageId, LessonId, BadgeId);

/// Mastery state of one lesson in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    pub id: LessonId,
    /// Best percentage reached so far, 0..=100.
    pub progress: u8,
    pub needs_review: bool,
    /// Raw score of the most recent attempt.
    pub last_score: Option<u32>,
    pub rating: Option<u8>,
}

impl LessonRecord {
    pub fn new(id: LessonId) -> Self {
        Self {
            id,
            progress: 0,
            needs_review: false,
            last_score: None,
            rating: None,
        }
    }

    pub fn is_mastered(&self) -> bool {
        self.progress == 100 && !self.needs_review
    }
}

/// Cross-language running totals for one learner.
///
/// Everything except `streak_days` only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerAggregate {
    pub streak_days: u32,
    pub coins: u64,
    pub xp: u64,
    pub completed_lesson_count: u64,
    #[serde(default)]
    pub perfect_score_count: u64,
    pub studied_languages: BTreeSet<LanguageId>,
}

/// Rejected call arguments. Raised before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("total must be greater than zero")]
    EmptyTotal,
    #[error("score {score} exceeds total {total}")]
    ScoreExceedsTotal { score: u32, total: u32 },
    #[error("progress {0} is outside 0..=100")]
    ProgressOutOfRange(u8),
    #[error("rating {0} is outside 1..=5")]
    RatingOutOfRange(u8),
    #[error("a flashcard session needs at least one term")]
    EmptyVocabSession,
}

/// Reference to an identifier the learner's state does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    #[error("unknown language '{0}'")]
    Language(LanguageId),
    #[error("unknown lesson '{lesson}' in language '{language}'")]
    Lesson {
        language: LanguageId,
        lesson: LessonId,
    },
    #[error("unknown daily goal '{0}'")]
    Goal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MasteryError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("not found: {0}")]
    NotFound(#[from] NotFound),
}
