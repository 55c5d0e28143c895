//! Repository layer for read-only aggregate queries
//!
//! Each record collection is reached through a store trait exposing the
//! fixed-shape aggregations the report builders need. Two implementations
//! exist: Postgres-backed stores that push each aggregation down to a single
//! SQL statement, and an in-memory store computing the same shapes over
//! plain vectors, used by tests.

pub mod bookings;
pub mod memory;
pub mod payments;
pub mod tours;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    api::stats::{BookedTourRank, StatEntry, TopBookedTour},
    error::AppResult,
    models::{booking::InvoiceRecord, user::ActiveStatus},
};

/// Aggregate queries over the users collection
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Total number of user accounts
    async fn count(&self) -> AppResult<i64>;
    /// Number of users with the given activity status
    async fn count_by_active_status(&self, status: ActiveStatus) -> AppResult<i64>;
    /// Number of users created at or after the cutoff instant
    async fn count_created_since(&self, cutoff: DateTime<Utc>) -> AppResult<i64>;
    /// User count per role, one entry per role value present in the data
    async fn count_by_role(&self) -> AppResult<Vec<StatEntry>>;
}

/// Aggregate queries over the tour listings collection
#[async_trait]
pub trait TourStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    async fn count_by_category(&self) -> AppResult<Vec<StatEntry>>;
    async fn count_by_country(&self) -> AppResult<Vec<StatEntry>>;
    async fn count_by_city(&self) -> AppResult<Vec<StatEntry>>;
    /// Mean listing price, `None` when there are no listings
    async fn average_price(&self) -> AppResult<Option<Decimal>>;
}

/// Aggregate queries over the bookings collection
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    async fn count_by_status(&self) -> AppResult<Vec<StatEntry>>;
    /// Most-booked tours: bookings grouped per tour, sorted by booking count
    /// descending, limited, then inner-joined to the listing for
    /// title/price/city. Groups referencing a deleted listing are dropped.
    async fn top_booked_tours(&self, limit: i64) -> AppResult<Vec<TopBookedTour>>;
    /// Same ranking with the title/slug projection
    async fn rank_tours_by_bookings(&self, limit: i64) -> AppResult<Vec<BookedTourRank>>;
    /// Mean guest count per booking, `None` when there are no bookings
    async fn average_guest_count(&self) -> AppResult<Option<Decimal>>;
    /// Number of bookings created at or after the cutoff instant
    async fn count_created_since(&self, cutoff: DateTime<Utc>) -> AppResult<i64>;
    /// Cardinality of the set of tourists that have ever booked
    async fn distinct_tourist_count(&self) -> AppResult<i64>;
    /// Billing data for a booking with a paid payment, `None` when the
    /// booking does not exist or was never paid
    async fn invoice_record(&self, booking_id: Uuid) -> AppResult<Option<InvoiceRecord>>;
}

/// Aggregate queries over the payments collection
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    async fn count_by_status(&self) -> AppResult<Vec<StatEntry>>;
    /// Sum of amounts over PAID payments only, `None` when there are none
    async fn paid_revenue(&self) -> AppResult<Option<Decimal>>;
    /// Mean amount over all payments regardless of status
    async fn average_amount(&self) -> AppResult<Option<Decimal>>;
    /// Payment count per gateway status, payments without gateway data
    /// bucketed under "UNKNOWN"
    async fn count_by_gateway_status(&self) -> AppResult<Vec<StatEntry>>;
}

/// Main repository struct bundling the four record stores
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UserStore>,
    pub tours: Arc<dyn TourStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub payments: Arc<dyn PaymentStore>,
}

impl Repository {
    /// Create a repository backed by a Postgres connection pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(users::PgUserStore::new(pool.clone())),
            tours: Arc::new(tours::PgTourStore::new(pool.clone())),
            bookings: Arc::new(bookings::PgBookingStore::new(pool.clone())),
            payments: Arc::new(payments::PgPaymentStore::new(pool)),
        }
    }

    /// Create a repository backed by an in-memory store
    pub fn in_memory(db: Arc<memory::MemoryDb>) -> Self {
        let store = memory::MemoryStore::new(db);
        Self {
            users: Arc::new(store.clone()),
            tours: Arc::new(store.clone()),
            bookings: Arc::new(store.clone()),
            payments: Arc::new(store),
        }
    }
}
