//! Alert lifecycle manager: creation with dedup, resolution, assignment.

use std::sync::Arc;

use crate::domain::{Alert, AlertCandidate, AlertId, DispenserId, Intervention, Role, UserId};
use crate::error::MonitorError;
use crate::persistence::Store;

/// Orchestrates the alert lifecycle on top of the [`Store`].
///
/// Upholds the central invariant: at most one alert of a given kind per
/// dispenser may be open at any time. The duplicate check-and-insert is
/// serialized by the store (partial unique index), so this holds under
/// concurrent ingestion for the same dispenser.
#[derive(Debug, Clone)]
pub struct AlertService {
    store: Arc<dyn Store>,
}

impl AlertService {
    /// Creates a new `AlertService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates alerts for the evaluator's candidates, skipping kinds that
    /// already have an open alert for this dispenser.
    ///
    /// All creations for one measurement are atomic as a group; a
    /// duplicate detected at the store layer collapses to a no-op rather
    /// than an error.
    ///
    /// # Errors
    ///
    /// Propagates store failures other than the duplicate conflict.
    pub async fn record_alerts(
        &self,
        dispenser_id: DispenserId,
        candidates: &[AlertCandidate],
    ) -> Result<Vec<Alert>, MonitorError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let created = match self.store.insert_alert_group(dispenser_id, candidates).await {
            Ok(created) => created,
            // Losing the duplicate race is not an error for the caller.
            Err(MonitorError::Conflict(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        for alert in &created {
            tracing::info!(
                %dispenser_id,
                alert_id = %alert.id,
                kind = alert.kind.as_str(),
                value = alert.triggering_value,
                "alert created"
            );
        }
        Ok(created)
    }

    /// Resolves an alert and records exactly one linked intervention whose
    /// kind derives from the alert kind.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::NotFound`] if the alert id does not exist.
    /// - [`MonitorError::AlreadyResolved`] if the alert is terminal;
    ///   resolving twice is a caller error to surface, not silent success.
    pub async fn resolve(
        &self,
        alert_id: AlertId,
        agent_id: UserId,
        comment: Option<&str>,
    ) -> Result<(Alert, Intervention), MonitorError> {
        let alert = self
            .store
            .find_alert(alert_id)
            .await?
            .ok_or_else(|| MonitorError::NotFound(format!("alert {alert_id}")))?;

        if alert.status.is_terminal() {
            return Err(MonitorError::AlreadyResolved(alert_id.as_i64()));
        }

        let kind = alert.kind.intervention_kind();
        let default_comment = format!("resolved {} alert", alert.kind.as_str());
        let comment = comment.filter(|c| !c.is_empty()).unwrap_or(&default_comment);

        // Update + intervention insert are one transaction in the store; a
        // concurrent double-resolve loses there with AlreadyResolved.
        let (alert, intervention) = self
            .store
            .mark_alert_resolved(alert_id, agent_id, kind, Some(comment))
            .await?;

        tracing::info!(
            alert_id = %alert.id,
            dispenser_id = %alert.dispenser_id,
            agent_id = %agent_id,
            intervention_id = %intervention.id,
            "alert resolved"
        );
        Ok((alert, intervention))
    }

    /// Assigns a field agent to an open alert.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::NotFound`] if the alert or the agent is missing.
    /// - [`MonitorError::InvalidRequest`] if the target user is not a
    ///   field agent.
    /// - [`MonitorError::AlreadyResolved`] if the alert is terminal.
    pub async fn assign(&self, alert_id: AlertId, agent_id: UserId) -> Result<Alert, MonitorError> {
        let alert = self
            .store
            .find_alert(alert_id)
            .await?
            .ok_or_else(|| MonitorError::NotFound(format!("alert {alert_id}")))?;

        if alert.status.is_terminal() {
            return Err(MonitorError::AlreadyResolved(alert_id.as_i64()));
        }

        let agent = self
            .store
            .find_user(agent_id)
            .await?
            .ok_or_else(|| MonitorError::NotFound(format!("user {agent_id}")))?;
        if agent.role != Role::Agent {
            return Err(MonitorError::InvalidRequest(format!(
                "user {agent_id} does not hold the agent role"
            )));
        }

        let alert = self.store.mark_alert_assigned(alert_id, agent_id).await?;
        tracing::info!(alert_id = %alert.id, agent_id = %agent_id, "alert assigned");
        Ok(alert)
    }
}
