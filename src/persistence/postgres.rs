//! PostgreSQL implementation of the persistence layer.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{
    Alert, AlertCandidate, AlertId, Dispenser, DispenserId, Intervention, InterventionKind,
    Measurement, NewUser, Reading, User, UserId,
};
use crate::error::MonitorError;

use super::models::{DispenserOverview, MeasurementStats};
use super::{DispenserFilter, Store};

const ALERT_COLUMNS: &str =
    "id, dispenser_id, kind, triggering_value, status, assigned_agent_id, triggered_at, resolved_at";

const DISPENSER_COLUMNS: &str = "id, device_uid, name, site_id, room, low_fill_threshold, \
     low_battery_threshold, assigned_agent_id, installed_on, is_active";

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, created_at, is_active";

const OVERVIEW_QUERY: &str = "SELECT d.id, d.device_uid, d.name, d.site_id, s.name AS site_name, \
            d.room, d.low_fill_threshold, d.low_battery_threshold, d.assigned_agent_id, \
            u.first_name || ' ' || u.last_name AS agent_name, d.is_active, \
            m.fill_percent AS last_fill_percent, m.battery_percent AS last_battery_percent, \
            m.recorded_at AS last_recorded_at, \
            (SELECT COUNT(*) FROM alerts a \
               WHERE a.dispenser_id = d.id AND a.status <> 'resolved') AS active_alerts \
     FROM dispensers d \
     JOIN sites s ON s.id = d.site_id \
     LEFT JOIN users u ON u.id = d.assigned_agent_id \
     LEFT JOIN LATERAL ( \
         SELECT fill_percent, battery_percent, recorded_at \
         FROM measurements \
         WHERE dispenser_id = d.id \
         ORDER BY recorded_at DESC \
         LIMIT 1 \
     ) m ON TRUE";

/// PostgreSQL-backed store using `sqlx::PgPool`.
///
/// The duplicate-open-alert invariant is enforced by a partial unique
/// index on `(dispenser_id, kind) WHERE status <> 'resolved'`, so the
/// check-and-insert in [`Store::insert_alert_group`] is serialized by the
/// database, not by application-level ordering.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs pending migrations from the embedded `migrations/` directory.
    ///
    /// # Errors
    ///
    /// Returns a [`MonitorError::Persistence`] if a migration fails.
    pub async fn run_migrations(&self) -> Result<(), MonitorError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MonitorError::Persistence(format!("migration failed: {e}")))
    }
}

fn db_err(e: sqlx::Error) -> MonitorError {
    MonitorError::Persistence(e.to_string())
}

#[async_trait]
impl Store for PostgresStore {
    async fn find_dispenser_by_device_uid(
        &self,
        device_uid: &str,
    ) -> Result<Option<Dispenser>, MonitorError> {
        sqlx::query_as::<_, Dispenser>(&format!(
            "SELECT {DISPENSER_COLUMNS} FROM dispensers WHERE device_uid = $1"
        ))
        .bind(device_uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn find_dispenser(&self, id: DispenserId) -> Result<Option<Dispenser>, MonitorError> {
        sqlx::query_as::<_, Dispenser>(&format!(
            "SELECT {DISPENSER_COLUMNS} FROM dispensers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn list_dispenser_overviews(
        &self,
        filter: &DispenserFilter,
    ) -> Result<Vec<DispenserOverview>, MonitorError> {
        let query = format!(
            "{OVERVIEW_QUERY} \
             WHERE ($1::BIGINT IS NULL OR d.site_id = $1) \
               AND ($2::BIGINT IS NULL OR d.assigned_agent_id = $2) \
               AND (NOT $3 OR EXISTS (SELECT 1 FROM alerts a \
                      WHERE a.dispenser_id = d.id AND a.status <> 'resolved')) \
             ORDER BY d.id"
        );
        sqlx::query_as::<_, DispenserOverview>(&query)
            .bind(filter.site_id)
            .bind(filter.assigned_agent_id)
            .bind(filter.with_active_alerts)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn dispenser_overview(
        &self,
        id: DispenserId,
    ) -> Result<Option<DispenserOverview>, MonitorError> {
        let query = format!("{OVERVIEW_QUERY} WHERE d.id = $1");
        sqlx::query_as::<_, DispenserOverview>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn assign_dispenser_agent(
        &self,
        id: DispenserId,
        agent_id: UserId,
    ) -> Result<Dispenser, MonitorError> {
        sqlx::query_as::<_, Dispenser>(&format!(
            "UPDATE dispensers SET assigned_agent_id = $2 WHERE id = $1 \
             RETURNING {DISPENSER_COLUMNS}"
        ))
        .bind(id)
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| MonitorError::NotFound(format!("dispenser {id}")))
    }

    async fn update_dispenser_thresholds(
        &self,
        id: DispenserId,
        low_fill: i16,
        low_battery: i16,
    ) -> Result<Dispenser, MonitorError> {
        sqlx::query_as::<_, Dispenser>(&format!(
            "UPDATE dispensers SET low_fill_threshold = $2, low_battery_threshold = $3 \
             WHERE id = $1 RETURNING {DISPENSER_COLUMNS}"
        ))
        .bind(id)
        .bind(low_fill)
        .bind(low_battery)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| MonitorError::NotFound(format!("dispenser {id}")))
    }

    async fn insert_measurement(
        &self,
        dispenser_id: DispenserId,
        reading: &Reading,
    ) -> Result<Measurement, MonitorError> {
        sqlx::query_as::<_, Measurement>(
            "INSERT INTO measurements (dispenser_id, fill_percent, battery_percent) \
             VALUES ($1, $2, $3) \
             RETURNING id, dispenser_id, fill_percent, battery_percent, recorded_at",
        )
        .bind(dispenser_id)
        .bind(reading.fill_percent)
        .bind(reading.battery_percent)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn measurements_for(
        &self,
        dispenser_id: DispenserId,
        limit: i64,
    ) -> Result<Vec<Measurement>, MonitorError> {
        sqlx::query_as::<_, Measurement>(
            "SELECT id, dispenser_id, fill_percent, battery_percent, recorded_at \
             FROM measurements WHERE dispenser_id = $1 \
             ORDER BY recorded_at DESC LIMIT $2",
        )
        .bind(dispenser_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn latest_measurement(
        &self,
        dispenser_id: DispenserId,
    ) -> Result<Option<Measurement>, MonitorError> {
        sqlx::query_as::<_, Measurement>(
            "SELECT id, dispenser_id, fill_percent, battery_percent, recorded_at \
             FROM measurements WHERE dispenser_id = $1 \
             ORDER BY recorded_at DESC LIMIT 1",
        )
        .bind(dispenser_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn measurement_stats(
        &self,
        dispenser_id: DispenserId,
    ) -> Result<Option<MeasurementStats>, MonitorError> {
        let row = sqlx::query_as::<_, (i64, Option<f64>, Option<f64>)>(
            "SELECT COUNT(*), AVG(fill_percent)::FLOAT8, AVG(battery_percent)::FLOAT8 \
             FROM measurements WHERE dispenser_id = $1",
        )
        .bind(dispenser_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        let (total, avg_fill, avg_battery) = row;
        Ok(match (avg_fill, avg_battery) {
            (Some(avg_fill_percent), Some(avg_battery_percent)) => Some(MeasurementStats {
                dispenser_id,
                total_measurements: total,
                avg_fill_percent,
                avg_battery_percent,
            }),
            _ => None,
        })
    }

    async fn insert_alert_group(
        &self,
        dispenser_id: DispenserId,
        candidates: &[AlertCandidate],
    ) -> Result<Vec<Alert>, MonitorError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // One transaction per measurement: either every winning insert is
        // visible or none are. Candidates losing the duplicate check hit
        // the partial unique index and insert nothing.
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut created = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let inserted = sqlx::query_as::<_, Alert>(&format!(
                "INSERT INTO alerts (dispenser_id, kind, triggering_value) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (dispenser_id, kind) WHERE status <> 'resolved' DO NOTHING \
                 RETURNING {ALERT_COLUMNS}"
            ))
            .bind(dispenser_id)
            .bind(candidate.kind)
            .bind(candidate.triggering_value)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;

            if let Some(alert) = inserted {
                created.push(alert);
            }
        }

        tx.commit().await.map_err(db_err)?;
        Ok(created)
    }

    async fn find_alert(&self, id: AlertId) -> Result<Option<Alert>, MonitorError> {
        sqlx::query_as::<_, Alert>(&format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn active_alerts(
        &self,
        dispenser_id: Option<DispenserId>,
    ) -> Result<Vec<Alert>, MonitorError> {
        sqlx::query_as::<_, Alert>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts \
             WHERE status <> 'resolved' \
               AND ($1::BIGINT IS NULL OR dispenser_id = $1) \
             ORDER BY triggered_at DESC"
        ))
        .bind(dispenser_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn mark_alert_resolved(
        &self,
        id: AlertId,
        agent_id: UserId,
        kind: InterventionKind,
        comment: Option<&str>,
    ) -> Result<(Alert, Intervention), MonitorError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Guarded update: a concurrent double-resolve matches zero rows.
        let alert = sqlx::query_as::<_, Alert>(&format!(
            "UPDATE alerts SET status = 'resolved', resolved_at = now(), \
                    assigned_agent_id = COALESCE(assigned_agent_id, $2) \
             WHERE id = $1 AND status <> 'resolved' \
             RETURNING {ALERT_COLUMNS}"
        ))
        .bind(id)
        .bind(agent_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or(MonitorError::AlreadyResolved(id.as_i64()))?;

        let intervention = sqlx::query_as::<_, Intervention>(
            "INSERT INTO interventions (dispenser_id, agent_id, kind, comment) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, dispenser_id, agent_id, kind, performed_at, comment",
        )
        .bind(alert.dispenser_id)
        .bind(agent_id)
        .bind(kind)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok((alert, intervention))
    }

    async fn mark_alert_assigned(
        &self,
        id: AlertId,
        agent_id: UserId,
    ) -> Result<Alert, MonitorError> {
        sqlx::query_as::<_, Alert>(&format!(
            "UPDATE alerts SET status = 'assigned', assigned_agent_id = $2 \
             WHERE id = $1 AND status <> 'resolved' \
             RETURNING {ALERT_COLUMNS}"
        ))
        .bind(id)
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(MonitorError::AlreadyResolved(id.as_i64()))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, MonitorError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, MonitorError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn insert_user(&self, new_user: &NewUser) -> Result<User, MonitorError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                MonitorError::EmailTaken(new_user.email.clone())
            } else {
                db_err(e)
            }
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, MonitorError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }
}
