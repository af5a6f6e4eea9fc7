use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::MaintenanceWindow;

use super::{MaintenanceStore, NewMaintenanceWindow, StoreError};

const WINDOW_COLUMNS: &str = "id, start_time, end_time, message_tr, message_en, \
     affected_services, is_active, scheduled_by, created_at";

/// sqlx-backed store against the atlas_main system database
pub struct PgMaintenanceStore {
    pool: PgPool,
}

impl PgMaintenanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaintenanceStore for PgMaintenanceStore {
    async fn effective_windows(&self, now: DateTime<Utc>) -> Result<Vec<MaintenanceWindow>, StoreError> {
        let sql = format!(
            "SELECT {} FROM maintenance_windows \
             WHERE is_active = true AND start_time <= $1 AND end_time >= $1 \
             ORDER BY start_time ASC",
            WINDOW_COLUMNS
        );

        let windows = sqlx::query_as::<_, MaintenanceWindow>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        Ok(windows)
    }

    async fn upcoming_windows(&self, now: DateTime<Utc>) -> Result<Vec<MaintenanceWindow>, StoreError> {
        let sql = format!(
            "SELECT {} FROM maintenance_windows \
             WHERE is_active = true AND start_time > $1 \
             ORDER BY start_time ASC",
            WINDOW_COLUMNS
        );

        let windows = sqlx::query_as::<_, MaintenanceWindow>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        Ok(windows)
    }

    async fn history(&self, limit: i64) -> Result<Vec<MaintenanceWindow>, StoreError> {
        let sql = format!(
            "SELECT {} FROM maintenance_windows \
             ORDER BY start_time DESC \
             LIMIT $1",
            WINDOW_COLUMNS
        );

        let windows = sqlx::query_as::<_, MaintenanceWindow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(windows)
    }

    async fn create(&self, window: NewMaintenanceWindow) -> Result<MaintenanceWindow, StoreError> {
        let sql = format!(
            "INSERT INTO maintenance_windows \
             (start_time, end_time, message_tr, message_en, affected_services, scheduled_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            WINDOW_COLUMNS
        );

        let created = sqlx::query_as::<_, MaintenanceWindow>(&sql)
            .bind(window.start_time)
            .bind(window.end_time)
            .bind(&window.message_tr)
            .bind(&window.message_en)
            .bind(&window.affected_services)
            .bind(window.scheduled_by)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn cancel(&self, id: Uuid) -> Result<(), StoreError> {
        // Idempotent: a second cancel matches zero rows and still succeeds
        sqlx::query("UPDATE maintenance_windows SET is_active = false WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM maintenance_windows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}
