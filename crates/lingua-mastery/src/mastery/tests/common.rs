use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::mastery::catalog::StaticLessonCatalog;
use crate::mastery::document::ProfileDocument;
use crate::mastery::domain::{LanguageId, LessonId, ProfileId};
use crate::mastery::repository::{
    AchievementNotifier, BadgeUnlocked, NotifyError, ProfileRepository, RepositoryError,
};
use crate::mastery::{BadgeTable, LearnerProfile, MasteryService, VocabRewardConfig};

pub(super) fn es() -> LanguageId {
    LanguageId::from("es")
}

pub(super) fn fr() -> LanguageId {
    LanguageId::from("fr")
}

pub(super) fn de() -> LanguageId {
    LanguageId::from("de")
}

pub(super) fn lesson(id: &str) -> LessonId {
    LessonId::from(id)
}

pub(super) fn catalog() -> Arc<StaticLessonCatalog> {
    Arc::new(StaticLessonCatalog::standard())
}

pub(super) fn badges() -> Arc<BadgeTable> {
    Arc::new(BadgeTable::standard())
}

pub(super) fn fresh_profile() -> LearnerProfile {
    LearnerProfile::new(
        ProfileId::from("learner-test"),
        badges(),
        VocabRewardConfig::default(),
    )
}

/// Profile with Spanish already selected.
pub(super) fn spanish_profile() -> LearnerProfile {
    let mut profile = fresh_profile();
    profile
        .select_language(&es(), catalog().as_ref())
        .expect("spanish is in the catalog");
    profile
}

pub(super) fn build_service() -> (
    MasteryService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = MasteryService::new(
        repository.clone(),
        notifier.clone(),
        catalog(),
        badges(),
        VocabRewardConfig::default(),
    );
    (service, repository, notifier)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) documents: Arc<Mutex<HashMap<ProfileId, ProfileDocument>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &ProfileId) -> Option<ProfileDocument> {
        self.documents
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl ProfileRepository for MemoryRepository {
    fn insert(&self, document: ProfileDocument) -> Result<ProfileDocument, RepositoryError> {
        let mut guard = self.documents.lock().expect("repository mutex poisoned");
        if guard.contains_key(&document.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(document.id.clone(), document.clone());
        Ok(document)
    }

    fn update(&self, document: ProfileDocument) -> Result<(), RepositoryError> {
        let mut guard = self.documents.lock().expect("repository mutex poisoned");
        guard.insert(document.id.clone(), document);
        Ok(())
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<ProfileDocument>, RepositoryError> {
        let guard = self.documents.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<BadgeUnlocked>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<BadgeUnlocked> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl AchievementNotifier for MemoryNotifier {
    fn publish(&self, event: BadgeUnlocked) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl AchievementNotifier for OfflineNotifier {
    fn publish(&self, _event: BadgeUnlocked) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("push gateway offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl ProfileRepository for UnavailableRepository {
    fn insert(&self, _document: ProfileDocument) -> Result<ProfileDocument, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _document: ProfileDocument) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ProfileId) -> Result<Option<ProfileDocument>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
