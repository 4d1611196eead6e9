//! Measurement ingestion and history DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DispenserId, Measurement, MeasurementId};

/// Request body for `POST /measurements` — one device report.
///
/// Sent by the on-board controller after each use.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IngestRequest {
    /// Stable device identifier (e.g. `"ESP32-001"`).
    pub device_uid: String,
    /// Remaining gel level in percent (0–100).
    pub fill_percent: i16,
    /// Remaining battery level in percent (0–100).
    pub battery_percent: i16,
}

/// Response body for `POST /measurements` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    /// Identifier of the stored measurement.
    pub measurement_id: MeasurementId,
    /// Dispenser the device identifier resolved to.
    pub dispenser_id: DispenserId,
    /// Server-side reception timestamp.
    pub recorded_at: DateTime<Utc>,
    /// Number of alerts created in reaction to this measurement.
    pub alerts_created: usize,
}

/// Query parameters for the measurement history endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HistoryParams {
    /// Maximum number of measurements to return (default 100, max 1000).
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl HistoryParams {
    /// Clamps `limit` to 1–1000.
    #[must_use]
    pub fn clamped(&self) -> i64 {
        self.limit.clamp(1, 1000)
    }
}

/// Response body for the per-dispenser statistics endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Dispenser the statistics cover.
    pub dispenser_id: DispenserId,
    /// Total number of measurements recorded.
    pub total_measurements: i64,
    /// Mean fill percentage over the whole log.
    pub avg_fill_percent: f64,
    /// Mean battery percentage over the whole log.
    pub avg_battery_percent: f64,
    /// Latest measurement.
    pub latest: Option<Measurement>,
    /// Most recent measurements, newest first.
    pub recent: Vec<Measurement>,
}
