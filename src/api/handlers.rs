use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use utoipa::OpenApi;

use super::{
    dto::{
        LatestReadingDto, MetricStatsDto, MonthYearDto, PeakReadingDto, PeakReportDto, ReadingDto,
        RelayControlRequest, RelayControlResponse, StatisticsDto,
    },
    AppState,
};
use crate::mqtt::models::RelayState;

/// Current cache snapshot. Responds with the zero reading until the first
/// message arrives; never touches the database.
#[utoipa::path(
    get,
    path = "/api/sensor/latest",
    responses((status = 200, description = "Latest reading", body = LatestReadingDto)),
    tag = "sensor"
)]
pub async fn get_latest(State(state): State<AppState>) -> Json<LatestReadingDto> {
    Json(state.cache.get().await.into())
}

/// Full reading history, newest first. Degrades to `[]` when the query
/// fails so the dashboard always receives a list.
#[utoipa::path(
    get,
    path = "/api/sensor/history",
    responses((status = 200, description = "All readings, newest first", body = Vec<ReadingDto>)),
    tag = "sensor"
)]
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<ReadingDto>> {
    match state.store.list_all().await {
        Ok(rows) => Json(rows.into_iter().map(Into::into).collect()),
        Err(e) => {
            error!(error = %e, "Failed to load reading history");
            Json(Vec::new())
        }
    }
}

/// Aggregate statistics over all readings. Backend failure degrades to an
/// `{"error": …}` body with status 200, which is what the dashboard
/// expects.
#[utoipa::path(
    get,
    path = "/api/sensor/statistics",
    responses((status = 200, description = "Aggregate statistics", body = StatisticsDto)),
    tag = "sensor"
)]
pub async fn get_statistics(State(state): State<AppState>) -> Response {
    match state.stats.aggregate_statistics().await {
        Ok(stats) => Json(StatisticsDto::from(stats)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute statistics");
            Json(json!({ "error": "Failed to get statistics" })).into_response()
        }
    }
}

/// Peak-value report backing the dashboard's max-value chart.
#[utoipa::path(
    get,
    path = "/api/sensor/statistik_data",
    responses((status = 200, description = "Peak-value report", body = PeakReportDto)),
    tag = "sensor"
)]
pub async fn get_statistik_data(State(state): State<AppState>) -> Response {
    match state.stats.peak_report().await {
        Ok(report) => Json(PeakReportDto::from(report)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute peak report");
            Json(json!({ "error": "Failed to get statistik data" })).into_response()
        }
    }
}

/// Publish a relay command to the device. Success means the local MQTT
/// client accepted the publish; device receipt is not awaited.
#[utoipa::path(
    post,
    path = "/api/relay/control",
    request_body = RelayControlRequest,
    responses((status = 200, description = "Publish outcome", body = RelayControlResponse)),
    tag = "relay"
)]
pub async fn control_relay(
    State(state): State<AppState>,
    Json(request): Json<RelayControlRequest>,
) -> Response {
    match state.control.send_relay_command(request.state).await {
        Ok(()) => Json(RelayControlResponse {
            status: "success".to_owned(),
            relay_state: request.state,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to publish relay command");
            Json(json!({ "status": "error", "message": e.to_string() })).into_response()
        }
    }
}

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy")),
    tag = "system"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(OpenApi)]
#[openapi(
    paths(get_latest, get_history, get_statistics, get_statistik_data, control_relay, health),
    components(schemas(
        LatestReadingDto,
        ReadingDto,
        MetricStatsDto,
        StatisticsDto,
        PeakReadingDto,
        MonthYearDto,
        PeakReportDto,
        RelayControlRequest,
        RelayControlResponse,
        RelayState,
    )),
    tags(
        (name = "sensor", description = "Telemetry read endpoints"),
        (name = "relay", description = "Actuator control"),
        (name = "system", description = "System endpoints"),
    ),
    info(
        title = "IoT Sensor Bridge API",
        version = "0.1.0",
        description = "REST API over MQTT-ingested sensor telemetry"
    )
)]
pub struct ApiDoc;
