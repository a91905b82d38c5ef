use crate::cli::ServeArgs;
use crate::infra::{
    load_badge_table, load_lesson_catalog, AppState, InMemoryNotifier, InMemoryProfileRepository,
};
use crate::routes::with_mastery_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lingua_mastery::config::AppConfig;
use lingua_mastery::error::AppError;
use lingua_mastery::mastery::MasteryService;
use lingua_mastery::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let badges = Arc::new(load_badge_table(&config.mastery)?);
    let catalog = Arc::new(load_lesson_catalog(&config.mastery)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryProfileRepository::default());
    let notifier = Arc::new(InMemoryNotifier::default());
    let mastery_service = Arc::new(MasteryService::new(
        repository,
        notifier,
        catalog,
        badges.clone(),
        config.mastery.vocab.clone(),
    ));

    let app = with_mastery_routes(mastery_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, badges = badges.len(), "mastery service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
