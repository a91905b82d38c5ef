use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::achievements::{AchievementEngine, BadgeStatus, BadgeTable, UnlockedBadge};
use super::catalog::{Difficulty, LessonCatalog, LessonDescriptor, LessonFilter};
use super::document::{LessonState, ProfileDocument};
use super::domain::{
    LanguageId, LearnerAggregate, LessonId, LessonRecord, MasteryError, NotFound, ProfileId,
};
use super::goals::{DailyGoal, DailyGoalBoard};
use super::progress::ProgressStore;
use super::review::{BinaryReviewPolicy, ReviewPolicy};
use super::scoring::{score_attempt, Reward, VocabRewardConfig};

const RETIRED_CATEGORY: &str = "Retired";
const RETIRED_DIFFICULTY: &str = "Unknown";

/// One learner's complete mastery state and the operations a UI calls on it.
///
/// Every operation validates its arguments and identifiers before touching
/// any state, so a returned error means nothing changed.
#[derive(Debug, Clone)]
pub struct LearnerProfile {
    id: ProfileId,
    aggregate: LearnerAggregate,
    progress: ProgressStore,
    achievements: AchievementEngine,
    goals: DailyGoalBoard,
    current_language: Option<LanguageId>,
    vocab: VocabRewardConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSelection {
    pub language: LanguageId,
    /// `true` when this call created the language's lesson records.
    pub materialized: bool,
    pub unlocked_badges: Vec<UnlockedBadge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonCompletion {
    pub reward: Reward,
    pub record: LessonRecord,
    pub unlocked_badges: Vec<UnlockedBadge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabSessionOutcome {
    pub xp_awarded: u64,
    pub unlocked_badges: Vec<UnlockedBadge>,
}

/// Lesson record joined with its catalog description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOverview {
    #[serde(flatten)]
    pub record: LessonRecord,
    pub title: String,
    pub category: String,
    pub difficulty: String,
}

/// Read-only view of everything a profile screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub id: ProfileId,
    pub aggregate: LearnerAggregate,
    pub current_language: Option<LanguageId>,
    pub badges: Vec<BadgeStatus>,
    pub progress: BTreeMap<LanguageId, Vec<LessonRecord>>,
    pub daily_goals: Vec<DailyGoal>,
    pub mastered_lessons: usize,
}

impl LearnerProfile {
    pub fn new(id: ProfileId, badges: Arc<BadgeTable>, vocab: VocabRewardConfig) -> Self {
        Self {
            id,
            aggregate: LearnerAggregate::default(),
            progress: ProgressStore::default(),
            achievements: AchievementEngine::new(badges),
            goals: DailyGoalBoard::standard(),
            current_language: None,
            vocab,
        }
    }

    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    pub fn aggregate(&self) -> &LearnerAggregate {
        &self.aggregate
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }

    pub fn goals(&self) -> &DailyGoalBoard {
        &self.goals
    }

    pub fn current_language(&self) -> Option<&LanguageId> {
        self.current_language.as_ref()
    }

    /// Study a language, creating its lesson records on first selection.
    /// Selecting an already studied language only moves the current pointer.
    pub fn select_language(
        &mut self,
        language: &LanguageId,
        catalog: &dyn LessonCatalog,
    ) -> Result<LanguageSelection, MasteryError> {
        let lessons = if self.progress.contains_language(language) {
            None
        } else {
            let lessons = catalog
                .lessons_for(language)
                .ok_or_else(|| NotFound::Language(language.clone()))?;
            Some(lessons)
        };

        let materialized = match lessons {
            Some(lessons) => self
                .progress
                .materialize(language, lessons.into_iter().map(|lesson| lesson.id)),
            None => false,
        };
        if materialized {
            info!(profile = %self.id, %language, "materialized lesson records");
        }

        self.aggregate.studied_languages.insert(language.clone());
        self.current_language = Some(language.clone());
        let unlocked_badges = self.achievements.reevaluate(&self.aggregate);

        Ok(LanguageSelection {
            language: language.clone(),
            materialized,
            unlocked_badges,
        })
    }

    pub fn complete_lesson(
        &mut self,
        language: &LanguageId,
        lesson: &LessonId,
        score: u32,
        total: u32,
    ) -> Result<LessonCompletion, MasteryError> {
        self.complete_lesson_with(&BinaryReviewPolicy, language, lesson, score, total)
    }

    /// Score a finished quiz, keep the best progress, update the review flag,
    /// credit the reward and re-evaluate badges.
    pub fn complete_lesson_with<P>(
        &mut self,
        policy: &P,
        language: &LanguageId,
        lesson: &LessonId,
        score: u32,
        total: u32,
    ) -> Result<LessonCompletion, MasteryError>
    where
        P: ReviewPolicy + ?Sized,
    {
        let attempt = score_attempt(score, total)?;
        self.progress.get(language, lesson)?;

        let needs_review = policy.needs_review(score, total);
        let record = self
            .progress
            .upsert_progress(language, lesson, attempt.progress, score, needs_review)?
            .clone();

        let reward = attempt.reward;
        self.aggregate.coins = self.aggregate.coins.saturating_add(reward.coins);
        self.aggregate.xp = self.aggregate.xp.saturating_add(reward.xp);
        self.aggregate.completed_lesson_count =
            self.aggregate.completed_lesson_count.saturating_add(1);
        if attempt.is_perfect() {
            self.aggregate.perfect_score_count =
                self.aggregate.perfect_score_count.saturating_add(1);
        }
        self.goals.record_lesson(reward.xp);

        info!(
            profile = %self.id,
            %language,
            %lesson,
            score,
            total,
            coins = reward.coins,
            xp = reward.xp,
            progress = record.progress,
            needs_review,
            "lesson completed"
        );

        let unlocked_badges = self.achievements.reevaluate(&self.aggregate);
        Ok(LessonCompletion {
            reward,
            record,
            unlocked_badges,
        })
    }

    /// Credit XP for a finished flashcard run. Progress, review flags and
    /// coins are left alone.
    pub fn complete_vocab_session(
        &mut self,
        language: &LanguageId,
        lesson: &LessonId,
        term_count: u32,
    ) -> Result<VocabSessionOutcome, MasteryError> {
        let xp_awarded = self.vocab.session_xp(term_count)?;
        self.progress.get(language, lesson)?;

        self.aggregate.xp = self.aggregate.xp.saturating_add(xp_awarded);
        info!(profile = %self.id, %language, %lesson, term_count, xp_awarded, "vocab session completed");

        let unlocked_badges = self.achievements.reevaluate(&self.aggregate);
        Ok(VocabSessionOutcome {
            xp_awarded,
            unlocked_badges,
        })
    }

    pub fn rate_lesson(
        &mut self,
        language: &LanguageId,
        lesson: &LessonId,
        rating: u8,
    ) -> Result<LessonRecord, MasteryError> {
        let record = self.progress.set_rating(language, lesson, rating)?;
        Ok(record.clone())
    }

    /// Streaks are computed outside the engine; this only records the value.
    pub fn record_streak(&mut self, streak_days: u32) -> Vec<UnlockedBadge> {
        self.aggregate.streak_days = streak_days;
        self.achievements.reevaluate(&self.aggregate)
    }

    pub fn advance_goal(&mut self, goal_id: &str, amount: u64) -> Result<DailyGoal, MasteryError> {
        let goal = self.goals.advance_manual(goal_id, amount)?;
        Ok(goal.clone())
    }

    /// Roll the daily goal board over to `today`.
    pub fn start_day(&mut self, today: NaiveDate) -> bool {
        self.goals.roll_over(today)
    }

    pub fn list_due_for_review(&self, language: &LanguageId) -> Result<Vec<LessonRecord>, MasteryError> {
        Ok(self
            .progress
            .list_due_for_review(language)?
            .into_iter()
            .cloned()
            .collect())
    }

    /// Records of one language joined with catalog metadata and filtered.
    pub fn lessons(
        &self,
        language: &LanguageId,
        catalog: &dyn LessonCatalog,
        filter: &LessonFilter,
    ) -> Result<Vec<LessonOverview>, MasteryError> {
        let records = self.progress.records(language)?;
        let descriptors: BTreeMap<LessonId, LessonDescriptor> = catalog
            .lessons_for(language)
            .unwrap_or_default()
            .into_iter()
            .map(|descriptor| (descriptor.id.clone(), descriptor))
            .collect();

        Ok(records
            .iter()
            .filter_map(|record| match descriptors.get(&record.id) {
                Some(descriptor) => filter.matches(descriptor).then(|| LessonOverview {
                    record: record.clone(),
                    title: descriptor.title.clone(),
                    category: descriptor.category.clone(),
                    difficulty: descriptor.difficulty.label().to_string(),
                }),
                // Kept from an older catalog; it has no difficulty to filter on.
                None => {
                    let retired = LessonDescriptor {
                        id: record.id.clone(),
                        title: record.id.to_string(),
                        category: RETIRED_CATEGORY.to_string(),
                        difficulty: Difficulty::Beginner,
                        vocabulary: Vec::new(),
                    };
                    (filter.difficulty.is_none() && filter.matches(&retired)).then(|| {
                        LessonOverview {
                            record: record.clone(),
                            title: retired.title,
                            category: retired.category,
                            difficulty: RETIRED_DIFFICULTY.to_string(),
                        }
                    })
                }
            })
            .collect())
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            id: self.id.clone(),
            aggregate: self.aggregate.clone(),
            current_language: self.current_language.clone(),
            badges: self.achievements.badges(),
            progress: self
                .progress
                .languages()
                .filter_map(|language| {
                    let records = self.progress.records(language).ok()?;
                    Some((language.clone(), records.to_vec()))
                })
                .collect(),
            daily_goals: self.goals.goals.clone(),
            mastered_lessons: self.progress.mastered_count(),
        }
    }

    pub fn to_document(&self) -> ProfileDocument {
        let progress = self
            .progress
            .languages()
            .filter_map(|language| {
                let records = self.progress.records(language).ok()?;
                let lessons = records
                    .iter()
                    .map(|record| (record.id.clone(), LessonState::from(record)))
                    .collect();
                Some((language.clone(), lessons))
            })
            .collect();

        ProfileDocument {
            id: self.id.clone(),
            aggregate: self.aggregate.clone(),
            badges: self.achievements.states(),
            progress,
            current_language: self.current_language.clone(),
            daily_goals: Some(self.goals.clone()),
            updated_at: None,
        }
    }

    /// Rebuild a profile from its document. Lesson order comes from the
    /// catalog; stored lessons the catalog no longer lists are kept at the end.
    pub fn restore(
        document: ProfileDocument,
        badges: Arc<BadgeTable>,
        catalog: &dyn LessonCatalog,
        vocab: VocabRewardConfig,
    ) -> Self {
        let ProfileDocument {
            id,
            mut aggregate,
            badges: badge_states,
            progress: stored_progress,
            current_language,
            daily_goals,
            updated_at: _,
        } = document;

        let mut progress = ProgressStore::default();
        for (language, mut stored) in stored_progress {
            let mut records: Vec<LessonRecord> = catalog
                .lessons_for(&language)
                .unwrap_or_default()
                .into_iter()
                .map(|descriptor| match stored.remove(&descriptor.id) {
                    Some(state) => state.into_record(descriptor.id),
                    None => LessonRecord::new(descriptor.id),
                })
                .collect();
            if !stored.is_empty() {
                warn!(profile = %id, %language, lessons = stored.len(), "keeping stored lessons missing from catalog");
                records.extend(stored.into_iter().map(|(lesson, state)| state.into_record(lesson)));
            }
            aggregate.studied_languages.insert(language.clone());
            progress.insert_records(language, records);
        }

        let achievements = AchievementEngine::restore(badges, &badge_states);

        Self {
            id,
            aggregate,
            progress,
            achievements,
            goals: daily_goals.unwrap_or_default(),
            current_language,
            vocab,
        }
    }
}
