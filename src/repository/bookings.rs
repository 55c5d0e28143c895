//! Bookings store, Postgres implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    api::stats::{BookedTourRank, StatEntry, TopBookedTour},
    error::AppResult,
    models::booking::InvoiceRecord,
    repository::BookingStore,
};

#[derive(Clone)]
pub struct PgBookingStore {
    pool: Pool<Postgres>,
}

impl PgBookingStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_by_status(&self) -> AppResult<Vec<StatEntry>> {
        let entries = sqlx::query(
            r#"
            SELECT status as label, COUNT(*) as value
            FROM bookings
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

    async fn top_booked_tours(&self, limit: i64) -> AppResult<Vec<TopBookedTour>> {
        // The join is inner on purpose: a ranked group whose listing was
        // deleted disappears from the result instead of carrying null fields.
        let rows = sqlx::query(
            r#"
            SELECT t.id as tour_id, t.title, t.price, t.city, ranked.booking_count
            FROM (
                SELECT tour_listing_id, COUNT(*) as booking_count
                FROM bookings
                GROUP BY tour_listing_id
                ORDER BY booking_count DESC, tour_listing_id ASC
                LIMIT $1
            ) ranked
            JOIN tour_listings t ON t.id = ranked.tour_listing_id
            ORDER BY ranked.booking_count DESC, t.id ASC
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopBookedTour {
                tour_id: row.get("tour_id"),
                title: row.get("title"),
                price: row.get("price"),
                city: row.get("city"),
                booking_count: row.get("booking_count"),
            })
            .collect())
    }

    async fn rank_tours_by_bookings(&self, limit: i64) -> AppResult<Vec<BookedTourRank>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id as tour_id, t.title, t.slug, ranked.booking_count
            FROM (
                SELECT tour_listing_id, COUNT(*) as booking_count
                FROM bookings
                GROUP BY tour_listing_id
                ORDER BY booking_count DESC, tour_listing_id ASC
                LIMIT $1
            ) ranked
            JOIN tour_listings t ON t.id = ranked.tour_listing_id
            ORDER BY ranked.booking_count DESC, t.id ASC
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| BookedTourRank {
                tour_id: row.get("tour_id"),
                title: row.get("title"),
                slug: row.get("slug"),
                booking_count: row.get("booking_count"),
            })
            .collect())
    }

    async fn average_guest_count(&self) -> AppResult<Option<Decimal>> {
        let avg: Option<Decimal> = sqlx::query_scalar("SELECT AVG(guest_count) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(avg)
    }

    async fn count_created_since(&self, cutoff: DateTime<Utc>) -> AppResult<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE created_at >= $1")
                .bind(cutoff)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    async fn distinct_tourist_count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT tourist_id) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn invoice_record(&self, booking_id: Uuid) -> AppResult<Option<InvoiceRecord>> {
        let row = sqlx::query(
            r#"
            SELECT p.transaction_id,
                   b.created_at as booking_date,
                   u.name as user_name,
                   t.title as tour_title,
                   b.guest_count,
                   p.amount as total_amount
            FROM bookings b
            JOIN payments p ON p.booking_id = b.id AND p.status = 'PAID'
            JOIN users u ON u.id = b.tourist_id
            JOIN tour_listings t ON t.id = b.tour_listing_id
            WHERE b.id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| InvoiceRecord {
            transaction_id: row.get("transaction_id"),
            booking_date: row.get("booking_date"),
            user_name: row.get("user_name"),
            tour_title: row.get("tour_title"),
            guest_count: row.get("guest_count"),
            total_amount: row.get("total_amount"),
        }))
    }
}
