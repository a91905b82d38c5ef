use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::ProfileDocument;
use super::domain::{BadgeId, ProfileId};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ProfileRepository: Send + Sync {
    fn insert(&self, document: ProfileDocument) -> Result<ProfileDocument, RepositoryError>;
    fn update(&self, document: ProfileDocument) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ProfileId) -> Result<Option<ProfileDocument>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("profile already exists")]
    Conflict,
    #[error("profile not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for badge unlocks (push notifications, toasts, feeds).
pub trait AchievementNotifier: Send + Sync {
    fn publish(&self, event: BadgeUnlocked) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeUnlocked {
    pub profile_id: ProfileId,
    pub badge_id: BadgeId,
    pub name: String,
    pub icon: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
