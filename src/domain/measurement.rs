//! Measurement domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{DispenserId, MeasurementId};

/// One telemetry report from a dispenser, before persistence.
///
/// Percentages are validated by the threshold evaluator and bounded by
/// check constraints in the store schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Remaining gel level in percent (0–100).
    pub fill_percent: i16,
    /// Remaining battery level in percent (0–100).
    pub battery_percent: i16,
}

/// A persisted measurement row. Immutable, append-only per dispenser.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Measurement {
    /// Row identifier.
    pub id: MeasurementId,
    /// Dispenser that reported the measurement.
    pub dispenser_id: DispenserId,
    /// Remaining gel level in percent.
    pub fill_percent: i16,
    /// Remaining battery level in percent.
    pub battery_percent: i16,
    /// Server-side reception timestamp.
    pub recorded_at: DateTime<Utc>,
}
