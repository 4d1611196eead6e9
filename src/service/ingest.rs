//! Measurement ingestion pipeline.

use std::sync::Arc;

use crate::domain::{Alert, Measurement, Reading, evaluate};
use crate::error::MonitorError;
use crate::persistence::Store;

use super::alerts::AlertService;

/// Result of a successful ingest call.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The durably stored measurement.
    pub measurement: Measurement,
    /// Alerts created in reaction to the measurement (deduped kinds are
    /// absent).
    pub alerts: Vec<Alert>,
}

/// Accepts device reports: resolves the dispenser, persists the
/// measurement, then evaluates thresholds and records alerts.
///
/// A measurement, once accepted, is never lost: the insert commits before
/// alerting runs, and an alerting failure propagates as an error without
/// rolling the measurement back.
#[derive(Debug, Clone)]
pub struct IngestService {
    store: Arc<dyn Store>,
    alerts: AlertService,
}

impl IngestService {
    /// Creates a new `IngestService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, alerts: AlertService) -> Self {
        Self { store, alerts }
    }

    /// Ingests one device report.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::InvalidRequest`] if a reading lies outside 0–100
    ///   (rejected before anything is persisted).
    /// - [`MonitorError::UnknownDevice`] if the device identifier is not
    ///   registered.
    /// - Store or evaluation failures after the measurement insert; the
    ///   measurement remains durable in that case.
    pub async fn ingest(
        &self,
        device_uid: &str,
        reading: Reading,
    ) -> Result<IngestOutcome, MonitorError> {
        for (what, value) in [
            ("fill_percent", reading.fill_percent),
            ("battery_percent", reading.battery_percent),
        ] {
            if !(0..=100).contains(&value) {
                return Err(MonitorError::InvalidRequest(format!(
                    "{what} must be between 0 and 100, got {value}"
                )));
            }
        }

        let dispenser = self
            .store
            .find_dispenser_by_device_uid(device_uid)
            .await?
            .ok_or_else(|| MonitorError::UnknownDevice(device_uid.to_string()))?;

        let measurement = self.store.insert_measurement(dispenser.id, &reading).await?;
        tracing::info!(
            dispenser_id = %dispenser.id,
            measurement_id = %measurement.id,
            fill = reading.fill_percent,
            battery = reading.battery_percent,
            "measurement recorded"
        );

        // The measurement is committed; from here on, failures are
        // alerting failures and must not pretend the ingest never happened.
        let alerts = match self.evaluate_and_record(&dispenser, &reading).await {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::warn!(
                    dispenser_id = %dispenser.id,
                    measurement_id = %measurement.id,
                    error = %e,
                    "measurement stored but alerting failed"
                );
                return Err(e);
            }
        };

        Ok(IngestOutcome {
            measurement,
            alerts,
        })
    }

    async fn evaluate_and_record(
        &self,
        dispenser: &crate::domain::Dispenser,
        reading: &Reading,
    ) -> Result<Vec<Alert>, MonitorError> {
        let candidates = evaluate(&dispenser.thresholds(), reading)?;
        self.alerts.record_alerts(dispenser.id, &candidates).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AlertKind, DispenserId};
    use crate::persistence::memory::MemoryStore;
    use crate::service::testing::dispenser;

    fn reading(fill: i16, battery: i16) -> Reading {
        Reading {
            fill_percent: fill,
            battery_percent: battery,
        }
    }

    async fn make_service() -> (Arc<MemoryStore>, IngestService) {
        let store = Arc::new(MemoryStore::new());
        store.add_dispenser(dispenser(1)).await;
        let dyn_store = Arc::clone(&store) as Arc<dyn Store>;
        let alerts = AlertService::new(Arc::clone(&dyn_store));
        (store, IngestService::new(dyn_store, alerts))
    }

    #[tokio::test]
    async fn unknown_device_is_rejected() {
        let (store, service) = make_service().await;
        let result = service.ingest("ESP32-999", reading(50, 50)).await;
        assert!(matches!(result, Err(MonitorError::UnknownDevice(_))));
        // Nothing was persisted.
        let latest = store.latest_measurement(DispenserId::new(1)).await;
        assert_eq!(latest.ok().flatten().map(|m| m.id), None);
    }

    #[tokio::test]
    async fn out_of_range_reading_is_rejected_before_persisting() {
        let (store, service) = make_service().await;
        let result = service.ingest("ESP32-001", reading(150, 50)).await;
        assert!(matches!(result, Err(MonitorError::InvalidRequest(_))));
        let latest = store.latest_measurement(DispenserId::new(1)).await;
        assert!(latest.ok().flatten().is_none());
    }

    #[tokio::test]
    async fn healthy_reading_stores_measurement_without_alerts() {
        let (store, service) = make_service().await;
        let Ok(outcome) = service.ingest("ESP32-001", reading(80, 90)).await else {
            panic!("ingest failed");
        };
        assert!(outcome.alerts.is_empty());
        assert_eq!(outcome.measurement.fill_percent, 80);

        let latest = store.latest_measurement(DispenserId::new(1)).await;
        assert_eq!(
            latest.ok().flatten().map(|m| m.id),
            Some(outcome.measurement.id)
        );
    }

    #[tokio::test]
    async fn critical_fill_reading_raises_one_alert() {
        let (_, service) = make_service().await;
        let Ok(outcome) = service.ingest("ESP32-001", reading(3, 50)).await else {
            panic!("ingest failed");
        };
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(
            outcome.alerts.first().map(|a| a.kind),
            Some(AlertKind::CriticalFill)
        );
        assert_eq!(outcome.alerts.first().map(|a| a.triggering_value), Some(3));
    }

    #[tokio::test]
    async fn low_reading_in_both_dimensions_raises_two_alerts() {
        let (_, service) = make_service().await;
        let Ok(outcome) = service.ingest("ESP32-001", reading(8, 8)).await else {
            panic!("ingest failed");
        };
        let kinds: Vec<AlertKind> = outcome.alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::LowFill, AlertKind::LowBattery]);
    }

    #[tokio::test]
    async fn repeated_low_readings_do_not_duplicate_alerts() {
        let (store, service) = make_service().await;
        assert!(service.ingest("ESP32-001", reading(8, 50)).await.is_ok());

        let Ok(second) = service.ingest("ESP32-001", reading(7, 50)).await else {
            panic!("ingest failed");
        };
        // The low-fill alert is still open, so the second report creates
        // nothing — but the measurement itself is stored.
        assert!(second.alerts.is_empty());
        let count = store
            .measurements_for(DispenserId::new(1), 100)
            .await
            .map(|v| v.len());
        assert_eq!(count.ok(), Some(2));
    }
}
