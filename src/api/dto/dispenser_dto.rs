//! Dispenser listing and management DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Alert, DispenserId, SiteId, UserId};

/// Query parameters for `GET /dispensers`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DispenserListParams {
    /// Only dispensers installed at this site.
    #[serde(default)]
    pub site_id: Option<SiteId>,
    /// Only dispensers with at least one open alert.
    #[serde(default)]
    pub active_alerts: bool,
}

/// Request body for `PUT /dispensers/:id/assign`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignAgentRequest {
    /// User to assign; must hold the field-agent role.
    pub agent_id: UserId,
}

/// Request body for `PUT /dispensers/:id/thresholds`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateThresholdsRequest {
    /// New low-fill alert threshold (1–100).
    pub low_fill_threshold: i16,
    /// New low-battery alert threshold (1–100).
    pub low_battery_threshold: i16,
}

/// Response body for `GET /dispensers/:id/alerts`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DispenserAlertsResponse {
    /// Dispenser the alerts belong to.
    pub dispenser_id: DispenserId,
    /// Dispenser name.
    pub name: String,
    /// Open alerts, most recent first.
    pub alerts: Vec<Alert>,
    /// Number of open alerts.
    pub total: usize,
}
