//! Mastery tracking for language lessons: per-lesson progress, review flags,
//! coin and XP rewards, daily goals, and one-way badge unlocks.
//!
//! [`LearnerProfile`] owns one learner's state and is usable on its own;
//! [`MasteryService`] adds persistence, per-learner locking, and badge
//! notifications, and [`mastery_router`] exposes the service over HTTP.

pub mod achievements;
pub mod catalog;
pub mod document;
pub mod domain;
pub mod goals;
pub mod profile;
pub(crate) mod progress;
pub mod repository;
pub mod review;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use achievements::{
    AchievementEngine, BadgeConfigError, BadgeDefinition, BadgeRequirement, BadgeState,
    BadgeStatus, BadgeTable, RequirementError, UnlockedBadge,
};
pub use catalog::{
    CatalogError, Difficulty, LanguageDescriptor, LessonCatalog, LessonDescriptor, LessonFilter,
    StaticLessonCatalog,
};
pub use document::{LessonState, ProfileDocument};
pub use domain::{
    BadgeId, InvalidInput, LanguageId, LearnerAggregate, LessonId, LessonRecord, MasteryError,
    NotFound, ProfileId,
};
pub use goals::{DailyGoal, DailyGoalBoard, GoalKind};
pub use profile::{
    LanguageSelection, LearnerProfile, LessonCompletion, LessonOverview, ProfileSnapshot,
    VocabSessionOutcome,
};
pub use progress::ProgressStore;
pub use repository::{
    AchievementNotifier, BadgeUnlocked, NotifyError, ProfileRepository, RepositoryError,
};
pub use review::{BinaryReviewPolicy, ReviewPolicy};
pub use router::mastery_router;
pub use scoring::{
    compute_reward, progress_percent, score_attempt, Reward, ScoredAttempt, VocabRewardConfig,
};
pub use service::{MasteryService, MasteryServiceError};
