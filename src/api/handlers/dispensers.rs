//! Dispenser handlers: fleet listing, agent assignment, thresholds.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{
    AssignAgentRequest, DispenserAlertsResponse, DispenserListParams, UpdateThresholdsRequest,
};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{Capability, DispenserId, Role};
use crate::error::{ErrorResponse, MonitorError};
use crate::persistence::DispenserFilter;

/// `GET /dispensers` — Fleet overview.
///
/// Field agents only see the dispensers assigned to them; every other
/// role sees the whole fleet.
///
/// # Errors
///
/// Returns [`MonitorError::Forbidden`] when the caller may not view the
/// fleet.
#[utoipa::path(
    get,
    path = "/api/v1/dispensers",
    tag = "Dispensers",
    summary = "List dispensers",
    description = "Returns dispensers joined with their site, assigned agent, latest measurement, and open-alert count. Agents are scoped to their own assignments.",
    params(DispenserListParams),
    responses(
        (status = 200, description = "Dispenser overviews", body = Vec<crate::persistence::models::DispenserOverview>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_dispensers(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<DispenserListParams>,
) -> Result<impl IntoResponse, MonitorError> {
    let mut filter = DispenserFilter {
        site_id: params.site_id,
        assigned_agent_id: None,
        with_active_alerts: params.active_alerts,
    };

    if auth.claims.role == Role::Agent {
        let caller = auth.load_user(&state).await?;
        filter.assigned_agent_id = Some(caller.id);
    } else {
        auth.require(Capability::ViewAllDispensers)?;
    }

    let overviews = state.store.list_dispenser_overviews(&filter).await?;
    Ok(Json(overviews))
}

/// `GET /dispensers/:id` — Single dispenser overview.
///
/// # Errors
///
/// Returns [`MonitorError::NotFound`] if the dispenser does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/dispensers/{id}",
    tag = "Dispensers",
    summary = "Get dispenser details",
    params(
        ("id" = i64, Path, description = "Dispenser identifier"),
    ),
    responses(
        (status = 200, description = "Dispenser overview", body = crate::persistence::models::DispenserOverview),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Dispenser not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_dispenser(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DispenserId>,
) -> Result<impl IntoResponse, MonitorError> {
    let overview = state
        .store
        .dispenser_overview(id)
        .await?
        .ok_or_else(|| MonitorError::NotFound(format!("dispenser {id}")))?;
    Ok(Json(overview))
}

/// `PUT /dispensers/:id/assign` — Assign a maintenance agent.
///
/// # Errors
///
/// - [`MonitorError::Forbidden`] when the caller may not assign.
/// - [`MonitorError::NotFound`] if the dispenser or target user is missing.
/// - [`MonitorError::InvalidRequest`] if the target is not a field agent.
#[utoipa::path(
    put,
    path = "/api/v1/dispensers/{id}/assign",
    tag = "Dispensers",
    summary = "Assign an agent to a dispenser",
    params(
        ("id" = i64, Path, description = "Dispenser identifier"),
    ),
    request_body = AssignAgentRequest,
    responses(
        (status = 200, description = "Updated dispenser", body = crate::domain::Dispenser),
        (status = 400, description = "Target user is not a field agent", body = ErrorResponse),
        (status = 403, description = "Caller may not assign dispensers", body = ErrorResponse),
        (status = 404, description = "Dispenser or user not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_dispenser(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DispenserId>,
    Json(req): Json<AssignAgentRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    auth.require(Capability::AssignDispenser)?;

    let agent = state
        .store
        .find_user(req.agent_id)
        .await?
        .ok_or_else(|| MonitorError::NotFound(format!("user {}", req.agent_id)))?;
    if agent.role != Role::Agent {
        return Err(MonitorError::InvalidRequest(format!(
            "user {} does not hold the agent role",
            req.agent_id
        )));
    }

    let dispenser = state.store.assign_dispenser_agent(id, req.agent_id).await?;
    tracing::info!(dispenser_id = %id, agent_id = %req.agent_id, "dispenser assigned");
    Ok(Json(dispenser))
}

/// `PUT /dispensers/:id/thresholds` — Update alert thresholds.
///
/// # Errors
///
/// - [`MonitorError::Forbidden`] when the caller may not update thresholds.
/// - [`MonitorError::InvalidRequest`] if a threshold lies outside 1–100.
/// - [`MonitorError::NotFound`] if the dispenser does not exist.
#[utoipa::path(
    put,
    path = "/api/v1/dispensers/{id}/thresholds",
    tag = "Dispensers",
    summary = "Update dispenser thresholds",
    description = "Sets the low-fill and low-battery thresholds. New values only affect future measurements; existing alerts are untouched.",
    params(
        ("id" = i64, Path, description = "Dispenser identifier"),
    ),
    request_body = UpdateThresholdsRequest,
    responses(
        (status = 200, description = "Updated dispenser", body = crate::domain::Dispenser),
        (status = 400, description = "Threshold out of range", body = ErrorResponse),
        (status = 403, description = "Caller may not update thresholds", body = ErrorResponse),
        (status = 404, description = "Dispenser not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_thresholds(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DispenserId>,
    Json(req): Json<UpdateThresholdsRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    auth.require(Capability::UpdateThresholds)?;

    for (what, value) in [
        ("low_fill_threshold", req.low_fill_threshold),
        ("low_battery_threshold", req.low_battery_threshold),
    ] {
        if !(1..=100).contains(&value) {
            return Err(MonitorError::InvalidRequest(format!(
                "{what} must be between 1 and 100, got {value}"
            )));
        }
    }

    let dispenser = state
        .store
        .update_dispenser_thresholds(id, req.low_fill_threshold, req.low_battery_threshold)
        .await?;
    tracing::info!(
        dispenser_id = %id,
        low_fill = req.low_fill_threshold,
        low_battery = req.low_battery_threshold,
        "thresholds updated"
    );
    Ok(Json(dispenser))
}

/// `GET /dispensers/:id/alerts` — Open alerts for one dispenser.
///
/// # Errors
///
/// Returns [`MonitorError::NotFound`] if the dispenser does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/dispensers/{id}/alerts",
    tag = "Dispensers",
    summary = "Open alerts for a dispenser",
    params(
        ("id" = i64, Path, description = "Dispenser identifier"),
    ),
    responses(
        (status = 200, description = "Open alerts, newest first", body = DispenserAlertsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Dispenser not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn dispenser_alerts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DispenserId>,
) -> Result<impl IntoResponse, MonitorError> {
    let dispenser = state
        .store
        .find_dispenser(id)
        .await?
        .ok_or_else(|| MonitorError::NotFound(format!("dispenser {id}")))?;
    let alerts = state.store.active_alerts(Some(id)).await?;

    Ok(Json(DispenserAlertsResponse {
        dispenser_id: dispenser.id,
        name: dispenser.name,
        total: alerts.len(),
        alerts,
    }))
}

/// Dispenser routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dispensers", get(list_dispensers))
        .route("/dispensers/{id}", get(get_dispenser))
        .route("/dispensers/{id}/assign", put(assign_dispenser))
        .route("/dispensers/{id}/thresholds", put(update_thresholds))
        .route("/dispensers/{id}/alerts", get(dispenser_alerts))
}
