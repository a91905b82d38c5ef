use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::achievements::UnlockedBadge;
use super::catalog::LessonFilter;
use super::domain::{LanguageId, LessonId, MasteryError, ProfileId};
use super::profile::LessonCompletion;
use super::repository::{AchievementNotifier, ProfileRepository, RepositoryError};
use super::service::{MasteryService, MasteryServiceError};

/// Router builder exposing the learner profile endpoints.
pub fn mastery_router<R, N>(service: Arc<MasteryService<R, N>>) -> Router
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    Router::new()
        .route("/languages", get(languages_handler::<R, N>))
        .route("/profiles", post(create_profile_handler::<R, N>))
        .route("/profiles/:profile_id", get(snapshot_handler::<R, N>))
        .route(
            "/profiles/:profile_id/languages/:language_id/select",
            post(select_language_handler::<R, N>),
        )
        .route(
            "/profiles/:profile_id/languages/:language_id/review",
            get(review_handler::<R, N>),
        )
        .route(
            "/profiles/:profile_id/languages/:language_id/lessons",
            get(lessons_handler::<R, N>),
        )
        .route(
            "/profiles/:profile_id/lessons/:lesson_id/complete",
            post(complete_lesson_handler::<R, N>),
        )
        .route(
            "/profiles/:profile_id/lessons/:lesson_id/rate",
            post(rate_lesson_handler::<R, N>),
        )
        .route(
            "/profiles/:profile_id/vocab/:lesson_id/complete",
            post(vocab_session_handler::<R, N>),
        )
        .route(
            "/profiles/:profile_id/streak",
            post(streak_handler::<R, N>),
        )
        .route(
            "/profiles/:profile_id/goals/:goal_id/advance",
            post(advance_goal_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub id: Option<ProfileId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonRequest {
    pub language_id: LanguageId,
    pub score: u32,
    pub total: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonCompletionView {
    pub coins_awarded: u64,
    pub xp_awarded: u64,
    pub new_progress: u8,
    pub needs_review: bool,
    pub unlocked_badges: Vec<UnlockedBadge>,
}

impl From<LessonCompletion> for LessonCompletionView {
    fn from(completion: LessonCompletion) -> Self {
        Self {
            coins_awarded: completion.reward.coins,
            xp_awarded: completion.reward.xp,
            new_progress: completion.record.progress,
            needs_review: completion.record.needs_review,
            unlocked_badges: completion.unlocked_badges,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabSessionRequest {
    pub language_id: LanguageId,
    /// Defaults to the lesson's catalog vocabulary size.
    #[serde(default)]
    pub term_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLessonRequest {
    pub language_id: LanguageId,
    pub rating: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRequest {
    pub streak_days: u32,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceGoalRequest {
    #[serde(default = "default_goal_step")]
    pub amount: u64,
}

fn default_goal_step() -> u64 {
    1
}

fn error_response(error: MasteryServiceError) -> Response {
    let status = match &error {
        MasteryServiceError::Mastery(MasteryError::InvalidInput(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        MasteryServiceError::Mastery(MasteryError::NotFound(_))
        | MasteryServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MasteryServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        MasteryServiceError::Repository(RepositoryError::Unavailable(_)) => {
            error!(%error, "profile storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (rejection.status(), Json(payload)).into_response()
}

pub(crate) async fn languages_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    (StatusCode::OK, Json(service.languages())).into_response()
}

pub(crate) async fn create_profile_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    request: Option<Json<CreateProfileRequest>>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    let request = request.map(|Json(request)| request).unwrap_or_default();
    match service.create_profile(request.id) {
        Ok(snapshot) => (StatusCode::CREATED, Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn snapshot_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    Path(profile_id): Path<String>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    match service.snapshot(&ProfileId(profile_id)) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn select_language_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    Path((profile_id, language_id)): Path<(String, String)>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    match service.select_language(&ProfileId(profile_id), &LanguageId(language_id)) {
        Ok(selection) => (StatusCode::OK, Json(selection)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    Path((profile_id, language_id)): Path<(String, String)>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    match service.due_for_review(&ProfileId(profile_id), &LanguageId(language_id)) {
        Ok(due) => (StatusCode::OK, Json(due)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn lessons_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    Path((profile_id, language_id)): Path<(String, String)>,
    Query(filter): Query<LessonFilter>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    match service.lessons(&ProfileId(profile_id), &LanguageId(language_id), &filter) {
        Ok(lessons) => (StatusCode::OK, Json(lessons)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_lesson_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    Path((profile_id, lesson_id)): Path<(String, String)>,
    request: Result<Json<CompleteLessonRequest>, JsonRejection>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.complete_lesson(
        &ProfileId(profile_id),
        &request.language_id,
        &LessonId(lesson_id),
        request.score,
        request.total,
    ) {
        Ok(completion) => {
            let view = LessonCompletionView::from(completion);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn vocab_session_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    Path((profile_id, lesson_id)): Path<(String, String)>,
    request: Result<Json<VocabSessionRequest>, JsonRejection>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.complete_vocab_session(
        &ProfileId(profile_id),
        &request.language_id,
        &LessonId(lesson_id),
        request.term_count,
    ) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rate_lesson_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    Path((profile_id, lesson_id)): Path<(String, String)>,
    request: Result<Json<RateLessonRequest>, JsonRejection>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.rate_lesson(
        &ProfileId(profile_id),
        &request.language_id,
        &LessonId(lesson_id),
        request.rating,
    ) {
        Ok(_) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn streak_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    Path(profile_id): Path<String>,
    request: Result<Json<StreakRequest>, JsonRejection>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.record_streak(&ProfileId(profile_id), request.streak_days) {
        Ok(unlocked_badges) => {
            let payload = json!({
                "streakDays": request.streak_days,
                "unlockedBadges": unlocked_badges,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn advance_goal_handler<R, N>(
    State(service): State<Arc<MasteryService<R, N>>>,
    Path((profile_id, goal_id)): Path<(String, String)>,
    request: Option<Json<AdvanceGoalRequest>>,
) -> Response
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    let amount = request
        .map(|Json(request)| request.amount)
        .unwrap_or_else(default_goal_step);
    match service.advance_goal(&ProfileId(profile_id), &goal_id, amount) {
        Ok(goal) => (StatusCode::OK, Json(goal)).into_response(),
        Err(error) => error_response(error),
    }
}
