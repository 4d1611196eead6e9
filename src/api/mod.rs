//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted under `/api/v1`; the health check lives at
//! the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// OpenAPI document covering every mounted endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "borne-monitor",
        description = "Monitoring backend for networked hand-sanitizer dispensers: measurement ingestion, threshold alerts, and maintenance interventions."
    ),
    paths(
        handlers::measurements::ingest_measurement,
        handlers::measurements::measurement_history,
        handlers::measurements::latest_measurement,
        handlers::measurements::measurement_stats,
        handlers::dispensers::list_dispensers,
        handlers::dispensers::get_dispenser,
        handlers::dispensers::assign_dispenser,
        handlers::dispensers::update_thresholds,
        handlers::dispensers::dispenser_alerts,
        handlers::alerts::list_alerts,
        handlers::alerts::resolve_alert,
        handlers::alerts::assign_alert,
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::me,
        handlers::auth::list_users,
        handlers::system::health_handler,
    ),
    components(schemas(
        crate::domain::Alert,
        crate::domain::AlertKind,
        crate::domain::AlertStatus,
        crate::domain::Dispenser,
        crate::domain::Intervention,
        crate::domain::InterventionKind,
        crate::domain::Measurement,
        crate::domain::Role,
        crate::domain::User,
        crate::persistence::models::DispenserOverview,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
        dto::IngestRequest,
        dto::IngestResponse,
        dto::StatsResponse,
        dto::AssignAgentRequest,
        dto::UpdateThresholdsRequest,
        dto::DispenserAlertsResponse,
        dto::ResolveAlertRequest,
        dto::ResolveAlertResponse,
        dto::AssignAlertRequest,
        dto::LoginRequest,
        dto::TokenResponse,
        dto::RegisterRequest,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Measurements", description = "Device telemetry ingestion and history"),
        (name = "Dispensers", description = "Fleet overview and management"),
        (name = "Alerts", description = "Alert lifecycle"),
        (name = "Auth", description = "Authentication and accounts"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` security scheme referenced by the
/// authenticated endpoints.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
