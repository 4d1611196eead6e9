//! Alert and intervention domain types.
//!
//! An [`Alert`] is derived state: it records that a measurement crossed a
//! threshold, and carries an open/resolved lifecycle. An [`Intervention`]
//! is the immutable audit record written when an alert is resolved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{AlertId, DispenserId, InterventionId, UserId};

/// Condition that triggered an alert.
///
/// Fill and battery are evaluated independently; critical kinds fire at the
/// fixed policy floor regardless of the dispenser's configured thresholds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "alert_kind", rename_all = "snake_case")]
pub enum AlertKind {
    /// Gel level at or below the configured low-fill threshold.
    LowFill,
    /// Gel level at or below the critical floor.
    CriticalFill,
    /// Battery level at or below the configured low-battery threshold.
    LowBattery,
    /// Battery level at or below the critical floor.
    CriticalBattery,
}

impl AlertKind {
    /// Maps an alert kind to the intervention recorded on resolution.
    ///
    /// Fill-related kinds call for a refill; battery-related kinds call
    /// for a battery change.
    #[must_use]
    pub const fn intervention_kind(self) -> InterventionKind {
        match self {
            Self::LowFill | Self::CriticalFill => InterventionKind::Refill,
            Self::LowBattery | Self::CriticalBattery => InterventionKind::BatteryChange,
        }
    }

    /// Returns `true` for the critical-floor kinds.
    #[must_use]
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::CriticalFill | Self::CriticalBattery)
    }

    /// Wire/database representation, matching the serde rename.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowFill => "low_fill",
            Self::CriticalFill => "critical_fill",
            Self::LowBattery => "low_battery",
            Self::CriticalBattery => "critical_battery",
        }
    }
}

/// Lifecycle status of an alert.
///
/// Transitions: `new → assigned → resolved` and `new → resolved`.
/// `resolved` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "alert_status", rename_all = "snake_case")]
pub enum AlertStatus {
    /// Freshly created, nobody assigned yet.
    New,
    /// An agent has been assigned to handle it.
    Assigned,
    /// Handled; a linked intervention exists. Terminal.
    Resolved,
}

impl AlertStatus {
    /// Returns `true` if no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// Kind of maintenance action recorded by an intervention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "intervention_kind", rename_all = "snake_case")]
pub enum InterventionKind {
    /// Gel reservoir refill.
    Refill,
    /// Battery replacement.
    BatteryChange,
    /// Generic maintenance not tied to an alert kind.
    Maintenance,
}

/// An alert candidate produced by the threshold evaluator.
///
/// Not yet persisted; the lifecycle manager decides whether a matching
/// open alert already exists before creating a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertCandidate {
    /// Triggered condition.
    pub kind: AlertKind,
    /// The measured value that crossed the threshold.
    pub triggering_value: i16,
}

/// A persisted alert row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Alert {
    /// Row identifier.
    pub id: AlertId,
    /// Dispenser the alert belongs to.
    pub dispenser_id: DispenserId,
    /// Triggered condition.
    pub kind: AlertKind,
    /// The measured value that crossed the threshold.
    pub triggering_value: i16,
    /// Lifecycle status.
    pub status: AlertStatus,
    /// Agent assigned to handle the alert, if any.
    pub assigned_agent_id: Option<UserId>,
    /// When the triggering measurement was evaluated.
    pub triggered_at: DateTime<Utc>,
    /// Set exactly once, on resolution.
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A persisted intervention row. Immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Intervention {
    /// Row identifier.
    pub id: InterventionId,
    /// Dispenser the intervention was performed on.
    pub dispenser_id: DispenserId,
    /// Acting agent.
    pub agent_id: UserId,
    /// Kind of maintenance performed.
    pub kind: InterventionKind,
    /// When the intervention was recorded.
    pub performed_at: DateTime<Utc>,
    /// Free-text comment from the acting agent.
    pub comment: Option<String>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn fill_kinds_map_to_refill() {
        assert_eq!(
            AlertKind::LowFill.intervention_kind(),
            InterventionKind::Refill
        );
        assert_eq!(
            AlertKind::CriticalFill.intervention_kind(),
            InterventionKind::Refill
        );
    }

    #[test]
    fn battery_kinds_map_to_battery_change() {
        assert_eq!(
            AlertKind::LowBattery.intervention_kind(),
            InterventionKind::BatteryChange
        );
        assert_eq!(
            AlertKind::CriticalBattery.intervention_kind(),
            InterventionKind::BatteryChange
        );
    }

    #[test]
    fn only_resolved_is_terminal() {
        assert!(!AlertStatus::New.is_terminal());
        assert!(!AlertStatus::Assigned.is_terminal());
        assert!(AlertStatus::Resolved.is_terminal());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&AlertKind::CriticalBattery).ok();
        assert_eq!(json.as_deref(), Some("\"critical_battery\""));
    }
}
