//! Users store, Postgres implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    api::stats::StatEntry,
    error::AppResult,
    models::user::ActiveStatus,
    repository::UserStore,
};

#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool<Postgres>,
}

impl PgUserStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_by_active_status(&self, status: ActiveStatus) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_created_since(&self, cutoff: DateTime<Utc>) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= $1")
            .bind(cutoff)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_by_role(&self) -> AppResult<Vec<StatEntry>> {
        let entries = sqlx::query(
            r#"
            SELECT role as label, COUNT(*) as value
            FROM users
            GROUP BY role
            ORDER BY value DESC, label ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| StatEntry {
            label: row.get("label"),
            value: row.get("value"),
        })
        .collect();
        Ok(entries)
    }
}
