//! Persistence layer: the domain store behind the service.
//!
//! Provides the [`Store`] trait for durable storage of dispensers,
//! measurements, alerts, interventions, and users. The concrete
//! implementation uses `sqlx::PgPool` for async PostgreSQL access; an
//! in-memory implementation backs the service tests.

pub mod models;
pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;

use crate::domain::{
    Alert, AlertCandidate, AlertId, Dispenser, DispenserId, Intervention, InterventionKind,
    Measurement, NewUser, Reading, SiteId, User, UserId,
};
use crate::error::MonitorError;

use models::{DispenserOverview, MeasurementStats};

/// Filters for the dispenser overview listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispenserFilter {
    /// Only dispensers installed at this site.
    pub site_id: Option<SiteId>,
    /// Only dispensers assigned to this agent (role scoping for agents).
    pub assigned_agent_id: Option<UserId>,
    /// Only dispensers with at least one open alert.
    pub with_active_alerts: bool,
}

/// Relational domain store.
///
/// One logical transaction per call; the duplicate-open-alert guard and
/// the resolve/intervention atomicity both live behind this seam so the
/// lifecycle manager stays testable without a database.
#[async_trait]
pub trait Store: std::fmt::Debug + Send + Sync {
    /// Resolves a device identifier to its dispenser, if registered.
    async fn find_dispenser_by_device_uid(
        &self,
        device_uid: &str,
    ) -> Result<Option<Dispenser>, MonitorError>;

    /// Looks up a dispenser by id.
    async fn find_dispenser(&self, id: DispenserId) -> Result<Option<Dispenser>, MonitorError>;

    /// Lists dispensers joined with site/agent names, latest measurement,
    /// and open-alert count.
    async fn list_dispenser_overviews(
        &self,
        filter: &DispenserFilter,
    ) -> Result<Vec<DispenserOverview>, MonitorError>;

    /// Single-dispenser variant of [`Store::list_dispenser_overviews`].
    async fn dispenser_overview(
        &self,
        id: DispenserId,
    ) -> Result<Option<DispenserOverview>, MonitorError>;

    /// Assigns a maintenance agent to a dispenser.
    async fn assign_dispenser_agent(
        &self,
        id: DispenserId,
        agent_id: UserId,
    ) -> Result<Dispenser, MonitorError>;

    /// Updates a dispenser's alert thresholds (bounded 1–100 upstream).
    async fn update_dispenser_thresholds(
        &self,
        id: DispenserId,
        low_fill: i16,
        low_battery: i16,
    ) -> Result<Dispenser, MonitorError>;

    /// Appends a measurement for a dispenser. Never updated or deleted.
    async fn insert_measurement(
        &self,
        dispenser_id: DispenserId,
        reading: &Reading,
    ) -> Result<Measurement, MonitorError>;

    /// Measurement history, most recent first.
    async fn measurements_for(
        &self,
        dispenser_id: DispenserId,
        limit: i64,
    ) -> Result<Vec<Measurement>, MonitorError>;

    /// Latest measurement for a dispenser, if any.
    async fn latest_measurement(
        &self,
        dispenser_id: DispenserId,
    ) -> Result<Option<Measurement>, MonitorError>;

    /// Aggregate statistics over a dispenser's measurement log.
    /// `None` when the dispenser has no measurements.
    async fn measurement_stats(
        &self,
        dispenser_id: DispenserId,
    ) -> Result<Option<MeasurementStats>, MonitorError>;

    /// Inserts alerts for the candidates that have no open alert of the
    /// same kind, atomically as a group. Candidates losing the
    /// duplicate-check are skipped, not errors. Returns only the rows
    /// actually created.
    async fn insert_alert_group(
        &self,
        dispenser_id: DispenserId,
        candidates: &[AlertCandidate],
    ) -> Result<Vec<Alert>, MonitorError>;

    /// Looks up an alert by id.
    async fn find_alert(&self, id: AlertId) -> Result<Option<Alert>, MonitorError>;

    /// Open (non-resolved) alerts, most recent first, optionally scoped
    /// to one dispenser.
    async fn active_alerts(
        &self,
        dispenser_id: Option<DispenserId>,
    ) -> Result<Vec<Alert>, MonitorError>;

    /// Marks an alert resolved and records the linked intervention, in one
    /// transaction. The update is guarded on non-terminal status: a
    /// concurrent double-resolve loses with
    /// [`MonitorError::AlreadyResolved`] and writes nothing.
    async fn mark_alert_resolved(
        &self,
        id: AlertId,
        agent_id: UserId,
        kind: InterventionKind,
        comment: Option<&str>,
    ) -> Result<(Alert, Intervention), MonitorError>;

    /// Assigns an agent to an open alert (guarded on non-terminal status).
    async fn mark_alert_assigned(
        &self,
        id: AlertId,
        agent_id: UserId,
    ) -> Result<Alert, MonitorError>;

    /// Looks up a user by id.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, MonitorError>;

    /// Looks up a user by login email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, MonitorError>;

    /// Creates a user account. Fails with [`MonitorError::EmailTaken`] on
    /// a duplicate email.
    async fn insert_user(&self, new_user: &NewUser) -> Result<User, MonitorError>;

    /// All user accounts.
    async fn list_users(&self) -> Result<Vec<User>, MonitorError>;
}
