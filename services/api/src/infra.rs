use lingua_mastery::config::MasteryConfig;
use lingua_mastery::mastery::{
    AchievementNotifier, BadgeConfigError, BadgeTable, BadgeUnlocked, CatalogError,
    NotifyError, ProfileDocument, ProfileId, ProfileRepository, RepositoryError,
    StaticLessonCatalog,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    documents: Arc<Mutex<HashMap<ProfileId, ProfileDocument>>>,
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Unavailable("profile store lock poisoned".to_string())
}

impl ProfileRepository for InMemoryProfileRepository {
    fn insert(&self, document: ProfileDocument) -> Result<ProfileDocument, RepositoryError> {
        let mut guard = self.documents.lock().map_err(poisoned)?;
        if guard.contains_key(&document.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(document.id.clone(), document.clone());
        Ok(document)
    }

    fn update(&self, document: ProfileDocument) -> Result<(), RepositoryError> {
        let mut guard = self.documents.lock().map_err(poisoned)?;
        if guard.contains_key(&document.id) {
            guard.insert(document.id.clone(), document);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<ProfileDocument>, RepositoryError> {
        let guard = self.documents.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }
}

/// Keeps published unlocks in memory and mirrors them to the log.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    events: Arc<Mutex<Vec<BadgeUnlocked>>>,
}

impl AchievementNotifier for InMemoryNotifier {
    fn publish(&self, event: BadgeUnlocked) -> Result<(), NotifyError> {
        info!(
            profile = %event.profile_id,
            badge = %event.badge_id,
            name = %event.name,
            "badge unlock published"
        );
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotifyError::Transport("event buffer lock poisoned".to_string()))?;
        guard.push(event);
        Ok(())
    }
}

impl InMemoryNotifier {
    pub(crate) fn events(&self) -> Vec<BadgeUnlocked> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Configured CSV table when set, the built-in table otherwise.
pub(crate) fn load_badge_table(config: &MasteryConfig) -> Result<BadgeTable, BadgeConfigError> {
    match &config.badges_csv {
        Some(path) => {
            let table = BadgeTable::from_path(path)?;
            info!(path = %path.display(), badges = table.len(), "loaded badge table");
            Ok(table)
        }
        None => Ok(BadgeTable::standard()),
    }
}

/// Configured lesson CSV served for every built-in language, or the built-in lessons.
pub(crate) fn load_lesson_catalog(
    config: &MasteryConfig,
) -> Result<StaticLessonCatalog, CatalogError> {
    match &config.catalog_csv {
        Some(path) => {
            let catalog =
                StaticLessonCatalog::from_path(StaticLessonCatalog::standard_languages(), path)?;
            info!(path = %path.display(), "loaded lesson catalog");
            Ok(catalog)
        }
        None => Ok(StaticLessonCatalog::standard()),
    }
}
