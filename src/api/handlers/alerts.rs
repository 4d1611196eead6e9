//! Alert handlers: active listing, resolution, assignment.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{AssignAlertRequest, ResolveAlertRequest, ResolveAlertResponse};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{AlertId, Capability};
use crate::error::{ErrorResponse, MonitorError};

/// `GET /alerts` — All open alerts across the fleet, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    tag = "Alerts",
    summary = "List open alerts",
    responses(
        (status = 200, description = "Open alerts, newest first", body = Vec<crate::domain::Alert>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, MonitorError> {
    let alerts = state.store.active_alerts(None).await?;
    Ok(Json(alerts))
}

/// `PUT /alerts/:id/resolve` — Resolve an alert.
///
/// Records exactly one intervention by the calling agent; the
/// intervention kind derives from the alert kind.
///
/// # Errors
///
/// - [`MonitorError::Forbidden`] when the caller may not resolve alerts.
/// - [`MonitorError::NotFound`] if the alert does not exist.
/// - [`MonitorError::AlreadyResolved`] if the alert is already terminal.
#[utoipa::path(
    put,
    path = "/api/v1/alerts/{id}/resolve",
    tag = "Alerts",
    summary = "Resolve an alert",
    description = "Marks the alert resolved and records the linked intervention atomically. Resolving an already-resolved alert is rejected with 409.",
    params(
        ("id" = i64, Path, description = "Alert identifier"),
    ),
    request_body = ResolveAlertRequest,
    responses(
        (status = 200, description = "Alert resolved", body = ResolveAlertResponse),
        (status = 403, description = "Caller may not resolve alerts", body = ErrorResponse),
        (status = 404, description = "Alert not found", body = ErrorResponse),
        (status = 409, description = "Alert already resolved", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn resolve_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<AlertId>,
    Json(req): Json<ResolveAlertRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    auth.require(Capability::ResolveAlert)?;
    let caller = auth.load_user(&state).await?;

    let (alert, intervention) = state
        .alerts
        .resolve(id, caller.id, req.comment.as_deref())
        .await?;
    Ok(Json(ResolveAlertResponse {
        alert,
        intervention,
    }))
}

/// `PUT /alerts/:id/assign` — Assign a field agent to an open alert.
///
/// # Errors
///
/// - [`MonitorError::Forbidden`] when the caller may not assign alerts.
/// - [`MonitorError::NotFound`] if the alert or the agent is missing.
/// - [`MonitorError::InvalidRequest`] if the target is not a field agent.
/// - [`MonitorError::AlreadyResolved`] if the alert is already terminal.
#[utoipa::path(
    put,
    path = "/api/v1/alerts/{id}/assign",
    tag = "Alerts",
    summary = "Assign an agent to an alert",
    params(
        ("id" = i64, Path, description = "Alert identifier"),
    ),
    request_body = AssignAlertRequest,
    responses(
        (status = 200, description = "Updated alert", body = crate::domain::Alert),
        (status = 400, description = "Target user is not a field agent", body = ErrorResponse),
        (status = 403, description = "Caller may not assign alerts", body = ErrorResponse),
        (status = 404, description = "Alert or user not found", body = ErrorResponse),
        (status = 409, description = "Alert already resolved", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<AlertId>,
    Json(req): Json<AssignAlertRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    auth.require(Capability::AssignAlert)?;
    let alert = state.alerts.assign(id, req.agent_id).await?;
    Ok(Json(alert))
}

/// Alert routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/{id}/resolve", put(resolve_alert))
        .route("/alerts/{id}/assign", put(assign_alert))
}
