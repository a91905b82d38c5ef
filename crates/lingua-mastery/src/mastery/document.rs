use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::achievements::BadgeState;
use super::domain::{LanguageId, LearnerAggregate, LessonId, LessonRecord, ProfileId};
use super::goals::DailyGoalBoard;

/// Stored state of one lesson; the lesson id is the map key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonState {
    pub progress: u8,
    pub needs_review: bool,
    #[serde(default)]
    pub last_score: Option<u32>,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl From<&LessonRecord> for LessonState {
    fn from(record: &LessonRecord) -> Self {
        Self {
            progress: record.progress,
            needs_review: record.needs_review,
            last_score: record.last_score,
            rating: record.rating,
        }
    }
}

impl LessonState {
    /// Clamp values a hand-edited document could carry out of range.
    pub(crate) fn into_record(self, id: LessonId) -> LessonRecord {
        LessonRecord {
            id,
            progress: self.progress.min(100),
            needs_review: self.needs_review,
            last_score: self.last_score,
            rating: self.rating.filter(|rating| (1..=5).contains(rating)),
        }
    }
}

/// Persisted per-learner state. Badge metadata is static configuration and
/// is not part of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub id: ProfileId,
    pub aggregate: LearnerAggregate,
    pub badges: Vec<BadgeState>,
    pub progress: BTreeMap<LanguageId, BTreeMap<LessonId, LessonState>>,
    #[serde(default)]
    pub current_language: Option<LanguageId>,
    #[serde(default)]
    pub daily_goals: Option<DailyGoalBoard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
