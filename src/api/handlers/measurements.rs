//! Measurement handlers: device ingestion, history, latest, statistics.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{HistoryParams, IngestRequest, IngestResponse, StatsResponse};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{DispenserId, Reading};
use crate::error::{ErrorResponse, MonitorError};

/// `POST /measurements` — Ingest one device report.
///
/// Unauthenticated by design: devices identify themselves by their stable
/// `device_uid`, which must already be registered.
///
/// # Errors
///
/// Returns [`MonitorError::InvalidRequest`] for out-of-range percentages
/// and [`MonitorError::UnknownDevice`] for unregistered identifiers.
#[utoipa::path(
    post,
    path = "/api/v1/measurements",
    tag = "Measurements",
    summary = "Ingest a device report",
    description = "Stores the measurement, evaluates thresholds, and creates alerts for crossed conditions. Duplicate open alerts of the same kind are not created.",
    request_body = IngestRequest,
    responses(
        (status = 201, description = "Measurement stored", body = IngestResponse),
        (status = 400, description = "Percentage out of range", body = ErrorResponse),
        (status = 404, description = "Unknown device identifier", body = ErrorResponse),
    )
)]
pub async fn ingest_measurement(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    let reading = Reading {
        fill_percent: req.fill_percent,
        battery_percent: req.battery_percent,
    };
    let outcome = state.ingest.ingest(&req.device_uid, reading).await?;

    let response = IngestResponse {
        measurement_id: outcome.measurement.id,
        dispenser_id: outcome.measurement.dispenser_id,
        recorded_at: outcome.measurement.recorded_at,
        alerts_created: outcome.alerts.len(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /measurements/dispenser/:id` — Measurement history, newest first.
///
/// # Errors
///
/// Returns [`MonitorError::NotFound`] if the dispenser does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/measurements/dispenser/{id}",
    tag = "Measurements",
    summary = "Measurement history for a dispenser",
    params(
        ("id" = i64, Path, description = "Dispenser identifier"),
        HistoryParams,
    ),
    responses(
        (status = 200, description = "Measurements, newest first", body = Vec<crate::domain::Measurement>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Dispenser not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn measurement_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DispenserId>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, MonitorError> {
    require_dispenser(&state, id).await?;
    let measurements = state.store.measurements_for(id, params.clamped()).await?;
    Ok(Json(measurements))
}

/// `GET /measurements/dispenser/:id/latest` — Most recent measurement.
///
/// # Errors
///
/// Returns [`MonitorError::NotFound`] if the dispenser does not exist or
/// has never reported.
#[utoipa::path(
    get,
    path = "/api/v1/measurements/dispenser/{id}/latest",
    tag = "Measurements",
    summary = "Latest measurement for a dispenser",
    params(
        ("id" = i64, Path, description = "Dispenser identifier"),
    ),
    responses(
        (status = 200, description = "Latest measurement", body = crate::domain::Measurement),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Dispenser not found or no measurements yet", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn latest_measurement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DispenserId>,
) -> Result<impl IntoResponse, MonitorError> {
    require_dispenser(&state, id).await?;
    let measurement = state
        .store
        .latest_measurement(id)
        .await?
        .ok_or_else(|| MonitorError::NotFound(format!("no measurements for dispenser {id}")))?;
    Ok(Json(measurement))
}

/// `GET /measurements/dispenser/:id/stats` — Aggregate statistics.
///
/// # Errors
///
/// Returns [`MonitorError::NotFound`] if the dispenser does not exist or
/// has never reported.
#[utoipa::path(
    get,
    path = "/api/v1/measurements/dispenser/{id}/stats",
    tag = "Measurements",
    summary = "Measurement statistics for a dispenser",
    params(
        ("id" = i64, Path, description = "Dispenser identifier"),
    ),
    responses(
        (status = 200, description = "Aggregate statistics", body = StatsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Dispenser not found or no measurements yet", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn measurement_stats(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DispenserId>,
) -> Result<impl IntoResponse, MonitorError> {
    require_dispenser(&state, id).await?;
    let stats = state
        .store
        .measurement_stats(id)
        .await?
        .ok_or_else(|| MonitorError::NotFound(format!("no measurements for dispenser {id}")))?;
    let recent = state.store.measurements_for(id, 10).await?;
    let latest = recent.first().cloned();

    Ok(Json(StatsResponse {
        dispenser_id: stats.dispenser_id,
        total_measurements: stats.total_measurements,
        avg_fill_percent: stats.avg_fill_percent,
        avg_battery_percent: stats.avg_battery_percent,
        latest,
        recent,
    }))
}

async fn require_dispenser(state: &AppState, id: DispenserId) -> Result<(), MonitorError> {
    state
        .store
        .find_dispenser(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| MonitorError::NotFound(format!("dispenser {id}")))
}

/// Measurement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/measurements", post(ingest_measurement))
        .route("/measurements/dispenser/{id}", get(measurement_history))
        .route(
            "/measurements/dispenser/{id}/latest",
            get(latest_measurement),
        )
        .route("/measurements/dispenser/{id}/stats", get(measurement_stats))
}
