use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::mastery::domain::ProfileId;
use crate::mastery::router::{complete_lesson_handler, CompleteLessonRequest};
use crate::mastery::{mastery_router, LanguageId, MasteryService, VocabRewardConfig};

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("json body")))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

fn router_with_learner() -> axum::Router {
    let (service, _, _) = build_service();
    let id = ProfileId::from("ana");
    service.create_profile(Some(id.clone())).expect("created");
    service.select_language(&id, &es()).expect("selected");
    mastery_router(Arc::new(service))
}

#[tokio::test]
async fn complete_route_returns_reward_view() {
    let router = router_with_learner();
    let response = router
        .oneshot(post_json(
            "/profiles/ana/lessons/l2/complete",
            json!({ "languageId": "es", "score": 3, "total": 10 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["coinsAwarded"], json!(25));
    assert_eq!(payload["xpAwarded"], json!(50));
    assert_eq!(payload["newProgress"], json!(30));
    assert_eq!(payload["needsReview"], json!(true));
    assert_eq!(payload["unlockedBadges"][0]["id"], json!("b1"));
}

#[tokio::test]
async fn complete_route_rejects_over_scoring() {
    let router = router_with_learner();
    let response = router
        .oneshot(post_json(
            "/profiles/ana/lessons/l1/complete",
            json!({ "languageId": "es", "score": 12, "total": 10 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("exceeds total"));
}

#[tokio::test]
async fn malformed_bodies_get_the_json_error_envelope() {
    let router = router_with_learner();
    let response = router
        .clone()
        .oneshot(post_json(
            "/profiles/ana/lessons/l1/rate",
            json!({ "languageId": "es", "rating": 300 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("rating"));

    let response = router
        .oneshot(
            Request::post("/profiles/ana/streak")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"streakDays\":"))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());
}

#[tokio::test]
async fn unknown_profile_and_lesson_are_not_found() {
    let router = router_with_learner();
    let response = router
        .clone()
        .oneshot(get("/profiles/ghost"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(post_json(
            "/profiles/ana/lessons/l404/rate",
            json!({ "languageId": "es", "rating": 3 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_route_reports_conflicts() {
    let router = router_with_learner();
    let response = router
        .clone()
        .oneshot(post_json("/profiles", json!({ "id": "ana" })))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .oneshot(Request::post("/profiles").body(Body::empty()).expect("request"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload["id"]
        .as_str()
        .unwrap_or_default()
        .starts_with("learner-"));
}

#[tokio::test]
async fn rate_vocab_and_streak_routes_round_out_the_profile() {
    let router = router_with_learner();

    let response = router
        .clone()
        .oneshot(post_json(
            "/profiles/ana/lessons/l1/rate",
            json!({ "languageId": "es", "rating": 5 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(response).await, json!({ "ok": true }));

    let response = router
        .clone()
        .oneshot(post_json(
            "/profiles/ana/vocab/l1/complete",
            json!({ "languageId": "es", "termCount": 3 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(response).await["xpAwarded"], json!(25));

    let response = router
        .clone()
        .oneshot(post_json("/profiles/ana/streak", json!({ "streakDays": 10 })))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["streakDays"], json!(10));
    assert_eq!(payload["unlockedBadges"][0]["name"], json!("Streak Master"));

    let response = router
        .oneshot(get("/profiles/ana"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = read_json_body(response).await;
    assert_eq!(snapshot["aggregate"]["xp"], json!(25));
    assert_eq!(snapshot["aggregate"]["streakDays"], json!(10));
    assert_eq!(snapshot["progress"]["es"][0]["rating"], json!(5));
    assert_eq!(snapshot["currentLanguage"], json!("es"));
}

#[tokio::test]
async fn review_and_lesson_listing_routes() {
    let router = router_with_learner();
    router
        .clone()
        .oneshot(post_json(
            "/profiles/ana/lessons/l3/complete",
            json!({ "languageId": "es", "score": 1, "total": 3 }),
        ))
        .await
        .expect("route executes");

    let response = router
        .clone()
        .oneshot(get("/profiles/ana/languages/es/review"))
        .await
        .expect("route executes");
    let due = read_json_body(response).await;
    assert_eq!(due.as_array().map(Vec::len), Some(1));
    assert_eq!(due[0]["id"], json!("l3"));

    let response = router
        .oneshot(get(
            "/profiles/ana/languages/es/lessons?difficulty=Advanced&search=culture",
        ))
        .await
        .expect("route executes");
    let lessons = read_json_body(response).await;
    assert_eq!(lessons.as_array().map(Vec::len), Some(1));
    assert_eq!(lessons[0]["title"], json!("Business Culture"));
}

#[tokio::test]
async fn complete_handler_maps_storage_failures_to_internal_error() {
    let service = Arc::new(MasteryService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifier::default()),
        catalog(),
        badges(),
        VocabRewardConfig::default(),
    ));

    let response = complete_lesson_handler::<UnavailableRepository, MemoryNotifier>(
        State(service),
        Path(("ana".to_string(), "l1".to_string())),
        Ok(axum::Json(CompleteLessonRequest {
            language_id: LanguageId::from("es"),
            score: 1,
            total: 1,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
