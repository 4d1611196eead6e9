//! In-memory [`Store`] implementation backing the service tests.
//!
//! A single mutex serializes every check-and-insert, which mirrors the
//! guarantee the partial unique index gives the PostgreSQL store.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{
    Alert, AlertCandidate, AlertId, AlertStatus, Dispenser, DispenserId, Intervention,
    InterventionId, InterventionKind, Measurement, MeasurementId, NewUser, Reading, User, UserId,
};
use crate::error::MonitorError;

use super::models::{DispenserOverview, MeasurementStats};
use super::{DispenserFilter, Store};

#[derive(Debug, Default)]
struct Inner {
    dispensers: HashMap<i64, Dispenser>,
    site_names: HashMap<i64, String>,
    users: HashMap<i64, User>,
    measurements: Vec<Measurement>,
    alerts: HashMap<i64, Alert>,
    interventions: Vec<Intervention>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn has_open_alert(&self, dispenser_id: DispenserId, kind: crate::domain::AlertKind) -> bool {
        self.alerts.values().any(|a| {
            a.dispenser_id == dispenser_id && a.kind == kind && !a.status.is_terminal()
        })
    }

    fn overview_for(&self, dispenser: &Dispenser) -> DispenserOverview {
        let latest = self
            .measurements
            .iter()
            .filter(|m| m.dispenser_id == dispenser.id)
            .max_by_key(|m| m.recorded_at);
        let active_alerts = self
            .alerts
            .values()
            .filter(|a| a.dispenser_id == dispenser.id && !a.status.is_terminal())
            .count() as i64;
        DispenserOverview {
            id: dispenser.id,
            device_uid: dispenser.device_uid.clone(),
            name: dispenser.name.clone(),
            site_id: dispenser.site_id,
            site_name: self
                .site_names
                .get(&dispenser.site_id.as_i64())
                .cloned()
                .unwrap_or_default(),
            room: dispenser.room.clone(),
            low_fill_threshold: dispenser.low_fill_threshold,
            low_battery_threshold: dispenser.low_battery_threshold,
            assigned_agent_id: dispenser.assigned_agent_id,
            agent_name: dispenser
                .assigned_agent_id
                .and_then(|id| self.users.get(&id.as_i64()))
                .map(User::display_name),
            is_active: dispenser.is_active,
            last_fill_percent: latest.map(|m| m.fill_percent),
            last_battery_percent: latest.map(|m| m.battery_percent),
            last_recorded_at: latest.map(|m| m.recorded_at),
            active_alerts,
        }
    }
}

/// Mutex-serialized in-memory store.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a site name for overview joins.
    pub(crate) async fn add_site(&self, id: i64, name: &str) {
        self.inner
            .lock()
            .await
            .site_names
            .insert(id, name.to_string());
    }

    pub(crate) async fn add_dispenser(&self, dispenser: Dispenser) {
        self.inner
            .lock()
            .await
            .dispensers
            .insert(dispenser.id.as_i64(), dispenser);
    }

    pub(crate) async fn add_user(&self, user: User) {
        self.inner.lock().await.users.insert(user.id.as_i64(), user);
    }

    /// Snapshot of every intervention recorded so far.
    pub(crate) async fn interventions(&self) -> Vec<Intervention> {
        self.inner.lock().await.interventions.clone()
    }

    /// Snapshot of every alert row, open or resolved.
    pub(crate) async fn all_alerts(&self) -> Vec<Alert> {
        self.inner.lock().await.alerts.values().cloned().collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_dispenser_by_device_uid(
        &self,
        device_uid: &str,
    ) -> Result<Option<Dispenser>, MonitorError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .dispensers
            .values()
            .find(|d| d.device_uid == device_uid)
            .cloned())
    }

    async fn find_dispenser(&self, id: DispenserId) -> Result<Option<Dispenser>, MonitorError> {
        Ok(self.inner.lock().await.dispensers.get(&id.as_i64()).cloned())
    }

    async fn list_dispenser_overviews(
        &self,
        filter: &DispenserFilter,
    ) -> Result<Vec<DispenserOverview>, MonitorError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<DispenserOverview> = inner
            .dispensers
            .values()
            .filter(|d| filter.site_id.is_none_or(|s| d.site_id == s))
            .filter(|d| {
                filter
                    .assigned_agent_id
                    .is_none_or(|a| d.assigned_agent_id == Some(a))
            })
            .map(|d| inner.overview_for(d))
            .filter(|o| !filter.with_active_alerts || o.active_alerts > 0)
            .collect();
        rows.sort_by_key(|o| o.id);
        Ok(rows)
    }

    async fn dispenser_overview(
        &self,
        id: DispenserId,
    ) -> Result<Option<DispenserOverview>, MonitorError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .dispensers
            .get(&id.as_i64())
            .map(|d| inner.overview_for(d)))
    }

    async fn assign_dispenser_agent(
        &self,
        id: DispenserId,
        agent_id: UserId,
    ) -> Result<Dispenser, MonitorError> {
        let mut inner = self.inner.lock().await;
        let dispenser = inner
            .dispensers
            .get_mut(&id.as_i64())
            .ok_or_else(|| MonitorError::NotFound(format!("dispenser {id}")))?;
        dispenser.assigned_agent_id = Some(agent_id);
        Ok(dispenser.clone())
    }

    async fn update_dispenser_thresholds(
        &self,
        id: DispenserId,
        low_fill: i16,
        low_battery: i16,
    ) -> Result<Dispenser, MonitorError> {
        let mut inner = self.inner.lock().await;
        let dispenser = inner
            .dispensers
            .get_mut(&id.as_i64())
            .ok_or_else(|| MonitorError::NotFound(format!("dispenser {id}")))?;
        dispenser.low_fill_threshold = low_fill;
        dispenser.low_battery_threshold = low_battery;
        Ok(dispenser.clone())
    }

    async fn insert_measurement(
        &self,
        dispenser_id: DispenserId,
        reading: &Reading,
    ) -> Result<Measurement, MonitorError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        let measurement = Measurement {
            id: MeasurementId::new(id),
            dispenser_id,
            fill_percent: reading.fill_percent,
            battery_percent: reading.battery_percent,
            recorded_at: Utc::now(),
        };
        inner.measurements.push(measurement.clone());
        Ok(measurement)
    }

    async fn measurements_for(
        &self,
        dispenser_id: DispenserId,
        limit: i64,
    ) -> Result<Vec<Measurement>, MonitorError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Measurement> = inner
            .measurements
            .iter()
            .filter(|m| m.dispenser_id == dispenser_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| std::cmp::Reverse(m.recorded_at));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn latest_measurement(
        &self,
        dispenser_id: DispenserId,
    ) -> Result<Option<Measurement>, MonitorError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .measurements
            .iter()
            .filter(|m| m.dispenser_id == dispenser_id)
            .max_by_key(|m| m.recorded_at)
            .cloned())
    }

    async fn measurement_stats(
        &self,
        dispenser_id: DispenserId,
    ) -> Result<Option<MeasurementStats>, MonitorError> {
        let inner = self.inner.lock().await;
        let rows: Vec<&Measurement> = inner
            .measurements
            .iter()
            .filter(|m| m.dispenser_id == dispenser_id)
            .collect();
        if rows.is_empty() {
            return Ok(None);
        }
        let total = rows.len() as i64;
        let sum_fill: i64 = rows.iter().map(|m| i64::from(m.fill_percent)).sum();
        let sum_battery: i64 = rows.iter().map(|m| i64::from(m.battery_percent)).sum();
        Ok(Some(MeasurementStats {
            dispenser_id,
            total_measurements: total,
            avg_fill_percent: sum_fill as f64 / total as f64,
            avg_battery_percent: sum_battery as f64 / total as f64,
        }))
    }

    async fn insert_alert_group(
        &self,
        dispenser_id: DispenserId,
        candidates: &[AlertCandidate],
    ) -> Result<Vec<Alert>, MonitorError> {
        // Single lock for the whole group: the check-and-insert is atomic,
        // like the transactional insert against the partial unique index.
        let mut inner = self.inner.lock().await;
        let mut created = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if inner.has_open_alert(dispenser_id, candidate.kind) {
                continue;
            }
            let id = inner.next_id();
            let alert = Alert {
                id: AlertId::new(id),
                dispenser_id,
                kind: candidate.kind,
                triggering_value: candidate.triggering_value,
                status: AlertStatus::New,
                assigned_agent_id: None,
                triggered_at: Utc::now(),
                resolved_at: None,
            };
            inner.alerts.insert(id, alert.clone());
            created.push(alert);
        }
        Ok(created)
    }

    async fn find_alert(&self, id: AlertId) -> Result<Option<Alert>, MonitorError> {
        Ok(self.inner.lock().await.alerts.get(&id.as_i64()).cloned())
    }

    async fn active_alerts(
        &self,
        dispenser_id: Option<DispenserId>,
    ) -> Result<Vec<Alert>, MonitorError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Alert> = inner
            .alerts
            .values()
            .filter(|a| !a.status.is_terminal())
            .filter(|a| dispenser_id.is_none_or(|d| a.dispenser_id == d))
            .cloned()
            .collect();
        rows.sort_by_key(|a| std::cmp::Reverse(a.triggered_at));
        Ok(rows)
    }

    async fn mark_alert_resolved(
        &self,
        id: AlertId,
        agent_id: UserId,
        kind: InterventionKind,
        comment: Option<&str>,
    ) -> Result<(Alert, Intervention), MonitorError> {
        let mut inner = self.inner.lock().await;
        let intervention_id = inner.next_id();
        let alert = inner
            .alerts
            .get_mut(&id.as_i64())
            .ok_or_else(|| MonitorError::NotFound(format!("alert {id}")))?;
        if alert.status.is_terminal() {
            return Err(MonitorError::AlreadyResolved(id.as_i64()));
        }
        alert.status = AlertStatus::Resolved;
        alert.resolved_at = Some(Utc::now());
        alert.assigned_agent_id.get_or_insert(agent_id);
        let alert = alert.clone();

        let intervention = Intervention {
            id: InterventionId::new(intervention_id),
            dispenser_id: alert.dispenser_id,
            agent_id,
            kind,
            performed_at: Utc::now(),
            comment: comment.map(str::to_string),
        };
        inner.interventions.push(intervention.clone());
        Ok((alert, intervention))
    }

    async fn mark_alert_assigned(
        &self,
        id: AlertId,
        agent_id: UserId,
    ) -> Result<Alert, MonitorError> {
        let mut inner = self.inner.lock().await;
        let alert = inner
            .alerts
            .get_mut(&id.as_i64())
            .ok_or_else(|| MonitorError::NotFound(format!("alert {id}")))?;
        if alert.status.is_terminal() {
            return Err(MonitorError::AlreadyResolved(id.as_i64()));
        }
        alert.status = AlertStatus::Assigned;
        alert.assigned_agent_id = Some(agent_id);
        Ok(alert.clone())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, MonitorError> {
        Ok(self.inner.lock().await.users.get(&id.as_i64()).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, MonitorError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, new_user: &NewUser) -> Result<User, MonitorError> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| u.email == new_user.email) {
            return Err(MonitorError::EmailTaken(new_user.email.clone()));
        }
        let id = inner.next_id();
        let user = User {
            id: UserId::new(id),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            role: new_user.role,
            created_at: Utc::now(),
            is_active: true,
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, MonitorError> {
        let inner = self.inner.lock().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }
}
