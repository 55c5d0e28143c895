//! Tour listings store, Postgres implementation

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Row};

use crate::{api::stats::StatEntry, error::AppResult, repository::TourStore};

#[derive(Clone)]
pub struct PgTourStore {
    pool: Pool<Postgres>,
}

impl PgTourStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn grouped_count(&self, column: &str) -> AppResult<Vec<StatEntry>> {
        // column is one of the fixed grouping fields below, never user input
        let query = format!(
            "SELECT {column} as label, COUNT(*) as value FROM tour_listings GROUP BY {column} ORDER BY value DESC, label ASC"
        );
        let entries = sqlx::query(&query)
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

#[async_trait]
impl TourStore for PgTourStore {
    async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tour_listings")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_by_category(&self) -> AppResult<Vec<StatEntry>> {
        self.grouped_count("category").await
    }

    async fn count_by_country(&self) -> AppResult<Vec<StatEntry>> {
        self.grouped_count("country").await
    }

    async fn count_by_city(&self) -> AppResult<Vec<StatEntry>> {
        self.grouped_count("city").await
    }

    async fn average_price(&self) -> AppResult<Option<Decimal>> {
        let avg: Option<Decimal> = sqlx::query_scalar("SELECT AVG(price) FROM tour_listings")
            .fetch_one(&self.pool)
            .await?;
        Ok(avg)
    }
}
