pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    control::ControlService, db::store::ReadingStore, reading_cache::ReadingCache,
    stats::StatisticsService,
};
use handlers::ApiDoc;

/// Everything the handlers reach for: the store, the latest-reading
/// cache, the statistics engine and the relay publisher.
#[derive(Clone)]
pub struct AppState {
    pub store: ReadingStore,
    pub cache: ReadingCache,
    pub stats: StatisticsService,
    pub control: ControlService,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/api/sensor/latest", get(handlers::get_latest))
        .route("/api/sensor/history", get(handlers::get_history))
        .route("/api/sensor/statistics", get(handlers::get_statistics))
        .route("/api/sensor/statistik_data", get(handlers::get_statistik_data))
        .route("/api/relay/control", post(handlers::control_relay))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        // The dashboard is served from another origin.
        .layer(CorsLayer::permissive())
}
