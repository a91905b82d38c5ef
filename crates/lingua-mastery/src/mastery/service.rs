use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use super::achievements::{BadgeTable, UnlockedBadge};
use super::catalog::{LanguageDescriptor, LessonCatalog, LessonFilter};
use super::domain::{LanguageId, LessonId, LessonRecord, MasteryError, NotFound, ProfileId};
use super::goals::DailyGoal;
use super::profile::{
    LanguageSelection, LearnerProfile, LessonCompletion, LessonOverview, ProfileSnapshot,
    VocabSessionOutcome,
};
use super::repository::{
    AchievementNotifier, BadgeUnlocked, ProfileRepository, RepositoryError,
};
use super::review::{BinaryReviewPolicy, ReviewPolicy};
use super::scoring::VocabRewardConfig;

/// Service composing persistence, the lesson catalog, and badge notifications
/// around [`LearnerProfile`].
///
/// Mutations for one learner run one at a time: each takes the learner's
/// lock, loads the document, applies the operation, and writes it back.
pub struct MasteryService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    catalog: Arc<dyn LessonCatalog>,
    badges: Arc<BadgeTable>,
    policy: Arc<dyn ReviewPolicy>,
    vocab: VocabRewardConfig,
    locks: Mutex<HashMap<ProfileId, Arc<Mutex<()>>>>,
    sequence: AtomicU64,
}

/// Generated ids that collide with caller-chosen ones are skipped, up to this many times.
const GENERATED_ID_ATTEMPTS: u32 = 32;

impl<R, N> MasteryService<R, N>
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        catalog: Arc<dyn LessonCatalog>,
        badges: Arc<BadgeTable>,
        vocab: VocabRewardConfig,
    ) -> Self {
        Self {
            repository,
            notifier,
            catalog,
            badges,
            policy: Arc::new(BinaryReviewPolicy),
            vocab,
            locks: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn with_review_policy(mut self, policy: Arc<dyn ReviewPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn languages(&self) -> Vec<LanguageDescriptor> {
        self.catalog.languages()
    }

    /// Create a fresh profile, generating an id when none is requested.
    pub fn create_profile(
        &self,
        requested: Option<ProfileId>,
    ) -> Result<ProfileSnapshot, MasteryServiceError> {
        if let Some(id) = requested {
            return self.insert_profile(id);
        }

        let mut attempts = 1;
        loop {
            match self.insert_profile(self.next_profile_id()) {
                Err(MasteryServiceError::Repository(RepositoryError::Conflict))
                    if attempts < GENERATED_ID_ATTEMPTS =>
                {
                    attempts += 1;
                }
                result => return result,
            }
        }
    }

    fn next_profile_id(&self) -> ProfileId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ProfileId(format!("learner-{id:06}"))
    }

    fn insert_profile(&self, id: ProfileId) -> Result<ProfileSnapshot, MasteryServiceError> {
        let mut profile = LearnerProfile::new(id, self.badges.clone(), self.vocab.clone());
        profile.start_day(Utc::now().date_naive());

        let mut document = profile.to_document();
        document.updated_at = Some(Utc::now());
        self.repository.insert(document)?;

        info!(profile = %profile.id(), "profile created");
        Ok(profile.snapshot())
    }

    pub fn select_language(
        &self,
        id: &ProfileId,
        language: &LanguageId,
    ) -> Result<LanguageSelection, MasteryServiceError> {
        let catalog = self.catalog.clone();
        self.mutate(id, |profile| {
            let selection = profile.select_language(language, catalog.as_ref())?;
            let unlocked = selection.unlocked_badges.clone();
            Ok((selection, unlocked))
        })
    }

    pub fn complete_lesson(
        &self,
        id: &ProfileId,
        language: &LanguageId,
        lesson: &LessonId,
        score: u32,
        total: u32,
    ) -> Result<LessonCompletion, MasteryServiceError> {
        let policy = self.policy.clone();
        self.mutate(id, |profile| {
            let completion =
                profile.complete_lesson_with(policy.as_ref(), language, lesson, score, total)?;
            let unlocked = completion.unlocked_badges.clone();
            Ok((completion, unlocked))
        })
    }

    /// Credit a flashcard session. Without an explicit count the session
    /// covers the lesson's full catalog vocabulary.
    pub fn complete_vocab_session(
        &self,
        id: &ProfileId,
        language: &LanguageId,
        lesson: &LessonId,
        term_count: Option<u32>,
    ) -> Result<VocabSessionOutcome, MasteryServiceError> {
        let term_count = match term_count {
            Some(count) => count,
            None => {
                let descriptor = self.catalog.describe(language, lesson).ok_or_else(|| {
                    MasteryError::from(NotFound::Lesson {
                        language: language.clone(),
                        lesson: lesson.clone(),
                    })
                })?;
                u32::try_from(descriptor.vocabulary.len()).unwrap_or(u32::MAX)
            }
        };

        self.mutate(id, |profile| {
            let outcome = profile.complete_vocab_session(language, lesson, term_count)?;
            let unlocked = outcome.unlocked_badges.clone();
            Ok((outcome, unlocked))
        })
    }

    pub fn rate_lesson(
        &self,
        id: &ProfileId,
        language: &LanguageId,
        lesson: &LessonId,
        rating: u8,
    ) -> Result<LessonRecord, MasteryServiceError> {
        self.mutate(id, |profile| {
            let record = profile.rate_lesson(language, lesson, rating)?;
            Ok((record, Vec::new()))
        })
    }

    pub fn record_streak(
        &self,
        id: &ProfileId,
        streak_days: u32,
    ) -> Result<Vec<UnlockedBadge>, MasteryServiceError> {
        self.mutate(id, |profile| {
            let unlocked = profile.record_streak(streak_days);
            Ok((unlocked.clone(), unlocked))
        })
    }

    pub fn advance_goal(
        &self,
        id: &ProfileId,
        goal_id: &str,
        amount: u64,
    ) -> Result<DailyGoal, MasteryServiceError> {
        self.mutate(id, |profile| {
            let goal = profile.advance_goal(goal_id, amount)?;
            Ok((goal, Vec::new()))
        })
    }

    pub fn due_for_review(
        &self,
        id: &ProfileId,
        language: &LanguageId,
    ) -> Result<Vec<LessonRecord>, MasteryServiceError> {
        let profile = self.load(id)?;
        Ok(profile.list_due_for_review(language)?)
    }

    pub fn lessons(
        &self,
        id: &ProfileId,
        language: &LanguageId,
        filter: &LessonFilter,
    ) -> Result<Vec<LessonOverview>, MasteryServiceError> {
        let profile = self.load(id)?;
        Ok(profile.lessons(language, self.catalog.as_ref(), filter)?)
    }

    pub fn snapshot(&self, id: &ProfileId) -> Result<ProfileSnapshot, MasteryServiceError> {
        let profile = self.load(id)?;
        Ok(profile.snapshot())
    }

    /// Read-only view; goals are rolled over in memory but not persisted.
    fn load(&self, id: &ProfileId) -> Result<LearnerProfile, MasteryServiceError> {
        let document = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let mut profile = LearnerProfile::restore(
            document,
            self.badges.clone(),
            self.catalog.as_ref(),
            self.vocab.clone(),
        );
        profile.start_day(Utc::now().date_naive());
        Ok(profile)
    }

    fn mutate<T, F>(&self, id: &ProfileId, operation: F) -> Result<T, MasteryServiceError>
    where
        F: FnOnce(&mut LearnerProfile) -> Result<(T, Vec<UnlockedBadge>), MasteryError>,
    {
        let lock = self.profile_lock(id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.apply(id, operation)
        };
        self.release_lock(id, lock);
        result
    }

    fn apply<T, F>(&self, id: &ProfileId, operation: F) -> Result<T, MasteryServiceError>
    where
        F: FnOnce(&mut LearnerProfile) -> Result<(T, Vec<UnlockedBadge>), MasteryError>,
    {
        let mut profile = self.load(id)?;
        let (value, unlocked) = operation(&mut profile)?;

        let mut document = profile.to_document();
        document.updated_at = Some(Utc::now());
        self.repository.update(document)?;

        self.announce(id, unlocked);
        Ok(value)
    }

    fn profile_lock(&self, id: &ProfileId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(id.clone()).or_default().clone()
    }

    /// Drops the map entry once no other caller holds or waits on it.
    fn release_lock(&self, id: &ProfileId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference lives in the map, the other is `lock`. Ours is dropped
        // while the map is still held so a later release sees the true count.
        let idle = Arc::strong_count(&lock) == 2;
        drop(lock);
        if idle {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Unlocks are already persisted; a failed notification is only logged.
    fn announce(&self, id: &ProfileId, unlocked: Vec<UnlockedBadge>) {
        for badge in unlocked {
            let event = BadgeUnlocked {
                profile_id: id.clone(),
                badge_id: badge.id,
                name: badge.name,
                icon: badge.icon,
                occurred_at: Utc::now(),
            };
            if let Err(error) = self.notifier.publish(event) {
                warn!(profile = %id, %error, "failed to publish badge unlock");
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MasteryServiceError {
    #[error(transparent)]
    Mastery(#[from] MasteryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
