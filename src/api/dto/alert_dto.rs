//! Alert lifecycle DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Alert, Intervention, UserId};

/// Request body for `PUT /alerts/:id/resolve`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResolveAlertRequest {
    /// Free-text comment recorded on the intervention. Defaults to a
    /// generated note naming the resolved condition.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Response body for `PUT /alerts/:id/resolve`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResolveAlertResponse {
    /// The resolved alert with its resolution timestamp.
    pub alert: Alert,
    /// The intervention recorded for the resolution.
    pub intervention: Intervention,
}

/// Request body for `PUT /alerts/:id/assign`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignAlertRequest {
    /// User to assign; must hold the field-agent role.
    pub agent_id: UserId,
}
