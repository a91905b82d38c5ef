use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use lingua_mastery::mastery::{
    mastery_router, AchievementNotifier, MasteryService, ProfileRepository,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_mastery_routes<R, N>(service: Arc<MasteryService<R, N>>) -> axum::Router
where
    R: ProfileRepository + 'static,
    N: AchievementNotifier + 'static,
{
    mastery_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryNotifier, InMemoryProfileRepository};
    use axum::body::Body;
    use axum::http::Request;
    use lingua_mastery::mastery::{BadgeTable, StaticLessonCatalog, VocabRewardConfig};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, InMemoryNotifier) {
        let notifier = InMemoryNotifier::default();
        let service = Arc::new(MasteryService::new(
            Arc::new(InMemoryProfileRepository::default()),
            Arc::new(notifier.clone()),
            Arc::new(StaticLessonCatalog::standard()),
            Arc::new(BadgeTable::standard()),
            VocabRewardConfig::default(),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let router = with_mastery_routes(service).layer(Extension(state));
        (router, notifier)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let (router, _) = app(false);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let (router, _) = app(true);
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn learner_flow_publishes_badge_unlocks() {
        let (router, notifier) = app(true);

        let response = router
            .clone()
            .oneshot(post_json("/profiles", json!({ "id": "mika" })))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);

        router
            .clone()
            .oneshot(post_json("/profiles/mika/languages/es/select", json!({})))
            .await
            .expect("route executes");

        let response = router
            .clone()
            .oneshot(post_json(
                "/profiles/mika/lessons/l1/complete",
                json!({ "languageId": "es", "score": 10, "total": 10 }),
            ))
            .await
            .expect("route executes");
        let payload = body_json(response).await;
        assert_eq!(payload["coinsAwarded"], json!(60));
        assert_eq!(payload["xpAwarded"], json!(120));
        assert_eq!(payload["newProgress"], json!(100));

        let names: Vec<String> = notifier
            .events()
            .into_iter()
            .map(|event| event.name)
            .collect();
        assert_eq!(names, vec!["First Word", "Perfect Score"]);

        let response = router
            .oneshot(Request::get("/languages").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        let languages = body_json(response).await;
        assert!(languages
            .as_array()
            .map(|languages| languages.iter().any(|language| language["id"] == "es"))
            .unwrap_or(false));
    }
}
