//! Dispenser ("borne") domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::evaluator::Thresholds;
use super::ids::{DispenserId, SiteId, UserId};

/// A physical gel-dispensing unit with networked telemetry.
///
/// Never deleted in normal operation; decommissioned units are
/// soft-deactivated via `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Dispenser {
    /// Row identifier.
    pub id: DispenserId,
    /// Stable device identifier reported by the on-board controller
    /// (e.g. `"ESP32-001"`).
    pub device_uid: String,
    /// Human-readable name.
    pub name: String,
    /// Site the dispenser is installed at.
    pub site_id: SiteId,
    /// Room or location within the site.
    pub room: String,
    /// Fill percentage at or below which a low-fill alert is raised (1–100).
    pub low_fill_threshold: i16,
    /// Battery percentage at or below which a low-battery alert is raised (1–100).
    pub low_battery_threshold: i16,
    /// Maintenance agent assigned to this dispenser, if any.
    pub assigned_agent_id: Option<UserId>,
    /// Installation date, if recorded.
    pub installed_on: Option<NaiveDate>,
    /// Soft-deactivation flag.
    pub is_active: bool,
}

impl Dispenser {
    /// Returns the configured alert thresholds for this dispenser.
    #[must_use]
    pub const fn thresholds(&self) -> Thresholds {
        Thresholds {
            low_fill: self.low_fill_threshold,
            low_battery: self.low_battery_threshold,
        }
    }
}

/// A site hosting one or more dispensers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Site {
    /// Row identifier.
    pub id: SiteId,
    /// Site name.
    pub name: String,
    /// Postal address.
    pub address: Option<String>,
    /// Technical manager responsible for the site, if any.
    pub technical_manager_id: Option<UserId>,
}
