//! In-memory store computing the same aggregate shapes as the Postgres
//! stores over plain vectors. Used by the test suites; never wired to the
//! production router.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    api::stats::{BookedTourRank, StatEntry, TopBookedTour},
    error::AppResult,
    models::{
        booking::{Booking, InvoiceRecord},
        payment::{Payment, PaymentStatus},
        tour::TourListing,
        user::{ActiveStatus, User},
    },
    repository::{BookingStore, PaymentStore, TourStore, UserStore},
};

/// Backing collections shared by the four store views
#[derive(Default)]
pub struct MemoryDb {
    pub users: RwLock<Vec<User>>,
    pub tours: RwLock<Vec<TourListing>>,
    pub bookings: RwLock<Vec<Booking>>,
    pub payments: RwLock<Vec<Payment>>,
}

#[derive(Clone)]
pub struct MemoryStore {
    db: Arc<MemoryDb>,
}

impl MemoryStore {
    pub fn new(db: Arc<MemoryDb>) -> Self {
        Self { db }
    }

    /// Bookings grouped per tour, sorted by count descending (ties by tour
    /// id), truncated to `limit`. The listing join happens after the cut,
    /// matching the pushed-down pipeline order.
    async fn ranked_tour_groups(&self, limit: usize) -> Vec<(Uuid, i64)> {
        let bookings = self.db.bookings.read().await;
        let mut counts: BTreeMap<Uuid, i64> = BTreeMap::new();
        for booking in bookings.iter() {
            *counts.entry(booking.tour_listing_id).or_insert(0) += 1;
        }
        let mut groups: Vec<(Uuid, i64)> = counts.into_iter().collect();
        groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        groups.truncate(limit);
        groups
    }
}

/// Count occurrences of each key, most frequent first (ties by label)
fn group_counts<I>(keys: I) -> Vec<StatEntry>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut entries: Vec<StatEntry> = counts
        .into_iter()
        .map(|(label, value)| StatEntry { label, value })
        .collect();
    entries.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
    entries
}

fn average(sum: Decimal, count: usize) -> Option<Decimal> {
    if count == 0 {
        None
    } else {
        Some(sum / Decimal::from(count as i64))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.db.users.read().await.len() as i64)
    }

    async fn count_by_active_status(&self, status: ActiveStatus) -> AppResult<i64> {
        let users = self.db.users.read().await;
        Ok(users.iter().filter(|u| u.is_active == status).count() as i64)
    }

    async fn count_created_since(&self, cutoff: DateTime<Utc>) -> AppResult<i64> {
        let users = self.db.users.read().await;
        Ok(users.iter().filter(|u| u.created_at >= cutoff).count() as i64)
    }

    async fn count_by_role(&self) -> AppResult<Vec<StatEntry>> {
        let users = self.db.users.read().await;
        Ok(group_counts(users.iter().map(|u| u.role.to_string())))
    }
}

#[async_trait]
impl TourStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.db.tours.read().await.len() as i64)
    }

    async fn count_by_category(&self) -> AppResult<Vec<StatEntry>> {
        let tours = self.db.tours.read().await;
        Ok(group_counts(tours.iter().map(|t| t.category.clone())))
    }

    async fn count_by_country(&self) -> AppResult<Vec<StatEntry>> {
        let tours = self.db.tours.read().await;
        Ok(group_counts(tours.iter().map(|t| t.country.clone())))
    }

    async fn count_by_city(&self) -> AppResult<Vec<StatEntry>> {
        let tours = self.db.tours.read().await;
        Ok(group_counts(tours.iter().map(|t| t.city.clone())))
    }

    async fn average_price(&self) -> AppResult<Option<Decimal>> {
        let tours = self.db.tours.read().await;
        let sum: Decimal = tours.iter().map(|t| t.price).sum();
        Ok(average(sum, tours.len()))
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.db.bookings.read().await.len() as i64)
    }

    async fn count_by_status(&self) -> AppResult<Vec<StatEntry>> {
        let bookings = self.db.bookings.read().await;
        Ok(group_counts(bookings.iter().map(|b| b.status.to_string())))
    }

    async fn top_booked_tours(&self, limit: i64) -> AppResult<Vec<TopBookedTour>> {
        let groups = self.ranked_tour_groups(limit as usize).await;
        let tours = self.db.tours.read().await;
        Ok(groups
            .into_iter()
            .filter_map(|(tour_id, booking_count)| {
                tours.iter().find(|t| t.id == tour_id).map(|t| TopBookedTour {
                    tour_id,
                    title: t.title.clone(),
                    price: t.price,
                    city: t.city.clone(),
                    booking_count,
                })
            })
            .collect())
    }

    async fn rank_tours_by_bookings(&self, limit: i64) -> AppResult<Vec<BookedTourRank>> {
        let groups = self.ranked_tour_groups(limit as usize).await;
        let tours = self.db.tours.read().await;
        Ok(groups
            .into_iter()
            .filter_map(|(tour_id, booking_count)| {
                tours.iter().find(|t| t.id == tour_id).map(|t| BookedTourRank {
                    tour_id,
                    title: t.title.clone(),
                    slug: t.slug.clone(),
                    booking_count,
                })
            })
            .collect())
    }

    async fn average_guest_count(&self) -> AppResult<Option<Decimal>> {
        let bookings = self.db.bookings.read().await;
        let sum: i64 = bookings.iter().map(|b| i64::from(b.guest_count)).sum();
        Ok(average(Decimal::from(sum), bookings.len()))
    }

    async fn count_created_since(&self, cutoff: DateTime<Utc>) -> AppResult<i64> {
        let bookings = self.db.bookings.read().await;
        Ok(bookings.iter().filter(|b| b.created_at >= cutoff).count() as i64)
    }

    async fn distinct_tourist_count(&self) -> AppResult<i64> {
        let bookings = self.db.bookings.read().await;
        let tourists: HashSet<Uuid> = bookings.iter().map(|b| b.tourist_id).collect();
        Ok(tourists.len() as i64)
    }

    async fn invoice_record(&self, booking_id: Uuid) -> AppResult<Option<InvoiceRecord>> {
        let bookings = self.db.bookings.read().await;
        let Some(booking) = bookings.iter().find(|b| b.id == booking_id) else {
            return Ok(None);
        };
        let payments = self.db.payments.read().await;
        let Some(payment) = payments
            .iter()
            .find(|p| p.booking_id == booking_id && p.status == PaymentStatus::Paid)
        else {
            return Ok(None);
        };
        let users = self.db.users.read().await;
        let tours = self.db.tours.read().await;
        let (Some(user), Some(tour)) = (
            users.iter().find(|u| u.id == booking.tourist_id),
            tours.iter().find(|t| t.id == booking.tour_listing_id),
        ) else {
            return Ok(None);
        };
        Ok(Some(InvoiceRecord {
            transaction_id: payment.transaction_id.clone(),
            booking_date: booking.created_at,
            user_name: user.name.clone(),
            tour_title: tour.title.clone(),
            guest_count: booking.guest_count,
            total_amount: payment.amount,
        }))
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.db.payments.read().await.len() as i64)
    }

    async fn count_by_status(&self) -> AppResult<Vec<StatEntry>> {
        let payments = self.db.payments.read().await;
        Ok(group_counts(payments.iter().map(|p| p.status.to_string())))
    }

    async fn paid_revenue(&self) -> AppResult<Option<Decimal>> {
        let payments = self.db.payments.read().await;
        let paid: Vec<Decimal> = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Paid)
            .map(|p| p.amount)
            .collect();
        if paid.is_empty() {
            Ok(None)
        } else {
            Ok(Some(paid.into_iter().sum()))
        }
    }

    async fn average_amount(&self) -> AppResult<Option<Decimal>> {
        let payments = self.db.payments.read().await;
        let sum: Decimal = payments.iter().map(|p| p.amount).sum();
        Ok(average(sum, payments.len()))
    }

    async fn count_by_gateway_status(&self) -> AppResult<Vec<StatEntry>> {
        let payments = self.db.payments.read().await;
        Ok(group_counts(payments.iter().map(|p| {
            p.gateway_status
                .clone()
                .unwrap_or_else(|| "UNKNOWN".to_string())
        })))
    }
}
