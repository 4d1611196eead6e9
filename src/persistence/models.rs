//! Read models produced by joined store queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DispenserId, SiteId, UserId};

/// One dispenser joined with its site, assigned agent, latest measurement,
/// and open-alert count — the row behind the status views.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DispenserOverview {
    /// Dispenser identifier.
    pub id: DispenserId,
    /// Stable device identifier.
    pub device_uid: String,
    /// Human-readable name.
    pub name: String,
    /// Site the dispenser is installed at.
    pub site_id: SiteId,
    /// Site name.
    pub site_name: String,
    /// Room or location within the site.
    pub room: String,
    /// Configured low-fill threshold.
    pub low_fill_threshold: i16,
    /// Configured low-battery threshold.
    pub low_battery_threshold: i16,
    /// Assigned maintenance agent, if any.
    pub assigned_agent_id: Option<UserId>,
    /// Display name of the assigned agent, if any.
    pub agent_name: Option<String>,
    /// Soft-deactivation flag.
    pub is_active: bool,
    /// Fill percentage from the latest measurement, if any.
    pub last_fill_percent: Option<i16>,
    /// Battery percentage from the latest measurement, if any.
    pub last_battery_percent: Option<i16>,
    /// Timestamp of the latest measurement, if any.
    pub last_recorded_at: Option<DateTime<Utc>>,
    /// Number of open (non-resolved) alerts.
    pub active_alerts: i64,
}

/// Aggregate statistics over one dispenser's measurement log.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeasurementStats {
    /// Dispenser the statistics cover.
    pub dispenser_id: DispenserId,
    /// Total number of measurements recorded.
    pub total_measurements: i64,
    /// Mean fill percentage over the whole log.
    pub avg_fill_percent: f64,
    /// Mean battery percentage over the whole log.
    pub avg_battery_percent: f64,
}
