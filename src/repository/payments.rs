//! Payments store, Postgres implementation

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Row};

use crate::{
    api::stats::StatEntry,
    error::AppResult,
    models::payment::PaymentStatus,
    repository::PaymentStore,
};

#[derive(Clone)]
pub struct PgPaymentStore {
    pool: Pool<Postgres>,
}

impl PgPaymentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_by_status(&self) -> AppResult<Vec<StatEntry>> {
        let entries = sqlx::query(
            r#"
            SELECT status as label, COUNT(*) as value
            FROM payments
            GROUP BY status
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

    async fn paid_revenue(&self) -> AppResult<Option<Decimal>> {
        let sum: Option<Decimal> =
            sqlx::query_scalar("SELECT SUM(amount) FROM payments WHERE status = $1")
                .bind(PaymentStatus::Paid.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(sum)
    }

    async fn average_amount(&self) -> AppResult<Option<Decimal>> {
        let avg: Option<Decimal> = sqlx::query_scalar("SELECT AVG(amount) FROM payments")
            .fetch_one(&self.pool)
            .await?;
        Ok(avg)
    }

    async fn count_by_gateway_status(&self) -> AppResult<Vec<StatEntry>> {
        // NULL gateway statuses form their own group, surfaced as UNKNOWN
        let entries = sqlx::query(
            r#"
            SELECT COALESCE(gateway_status, 'UNKNOWN') as label, COUNT(*) as value
            FROM payments
            GROUP BY gateway_status
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
