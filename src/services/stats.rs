//! Statistics service
//!
//! Four independent report builders (users, tours, bookings, payments).
//! Each builder captures `now` once, launches its batch of read-only
//! aggregate queries concurrently and merges the results into one report.
//! A failing sub-query fails the whole report; partial reports are never
//! returned.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crate::{
    api::stats::{
        BookingStatsResponse, PaymentStatsResponse, TourStatsResponse, UserStatsResponse,
    },
    error::AppResult,
    models::user::ActiveStatus,
    repository::{BookingStore, PaymentStore, Repository, TourStore, UserStore},
};

/// Number of tours in the tour report ranking
const TOP_TOURS_LIMIT: i64 = 5;
/// Number of tours in the booking report ranking
const TOP_BOOKED_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Build the user statistics report
    pub async fn user_stats(&self) -> AppResult<UserStatsResponse> {
        let users = &self.repository.users;

        // Both window cutoffs derive from a single instant so the 7-day and
        // 30-day counts stay consistent with each other within one call.
        let now = Utc::now();
        let seven_days_ago = now - Duration::days(7);
        let thirty_days_ago = now - Duration::days(30);

        let (
            total_users,
            total_active_users,
            total_inactive_users,
            total_blocked_users,
            new_users_last_7_days,
            new_users_last_30_days,
            users_by_role,
        ) = tokio::try_join!(
            users.count(),
            users.count_by_active_status(ActiveStatus::Active),
            users.count_by_active_status(ActiveStatus::Inactive),
            users.count_by_active_status(ActiveStatus::Blocked),
            users.count_created_since(seven_days_ago),
            users.count_created_since(thirty_days_ago),
            users.count_by_role(),
        )?;

        Ok(UserStatsResponse {
            total_users,
            total_active_users,
            total_inactive_users,
            total_blocked_users,
            new_users_last_7_days,
            new_users_last_30_days,
            users_by_role,
        })
    }

    /// Build the tour statistics report
    pub async fn tour_stats(&self) -> AppResult<TourStatsResponse> {
        let tours = &self.repository.tours;
        let bookings = &self.repository.bookings;

        let (
            total_tours,
            tours_by_category,
            tours_by_country,
            tours_by_city,
            average_price,
            top_booked_tours,
        ) = tokio::try_join!(
            tours.count(),
            tours.count_by_category(),
            tours.count_by_country(),
            tours.count_by_city(),
            tours.average_price(),
            bookings.top_booked_tours(TOP_TOURS_LIMIT),
        )?;

        Ok(TourStatsResponse {
            total_tours,
            tours_by_category,
            tours_by_country,
            tours_by_city,
            average_price: average_price.unwrap_or(Decimal::ZERO),
            top_booked_tours,
        })
    }

    /// Build the booking statistics report
    pub async fn booking_stats(&self) -> AppResult<BookingStatsResponse> {
        let bookings = &self.repository.bookings;

        let now = Utc::now();
        let seven_days_ago = now - Duration::days(7);
        let thirty_days_ago = now - Duration::days(30);

        let (
            total_bookings,
            bookings_by_status,
            top_booked_tours,
            average_guest_count,
            bookings_last_7_days,
            bookings_last_30_days,
            unique_booking_users,
        ) = tokio::try_join!(
            bookings.count(),
            bookings.count_by_status(),
            bookings.rank_tours_by_bookings(TOP_BOOKED_LIMIT),
            bookings.average_guest_count(),
            bookings.count_created_since(seven_days_ago),
            bookings.count_created_since(thirty_days_ago),
            bookings.distinct_tourist_count(),
        )?;

        Ok(BookingStatsResponse {
            total_bookings,
            bookings_by_status,
            top_booked_tours,
            // The aggregate yields no group when there are no bookings;
            // an empty store reads as an average of zero, not a fault.
            average_guest_count: average_guest_count.unwrap_or(Decimal::ZERO),
            bookings_last_7_days,
            bookings_last_30_days,
            unique_booking_users,
        })
    }

    /// Build the payment statistics report
    pub async fn payment_stats(&self) -> AppResult<PaymentStatsResponse> {
        let payments = &self.repository.payments;

        let (
            total_payments,
            payments_by_status,
            total_revenue,
            average_amount,
            payments_by_gateway_status,
        ) = tokio::try_join!(
            payments.count(),
            payments.count_by_status(),
            payments.paid_revenue(),
            payments.average_amount(),
            payments.count_by_gateway_status(),
        )?;

        Ok(PaymentStatsResponse {
            total_payments,
            payments_by_status,
            total_revenue: total_revenue.unwrap_or(Decimal::ZERO),
            average_amount: average_amount.unwrap_or(Decimal::ZERO),
            payments_by_gateway_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::api::stats::StatEntry;
    use crate::models::{
        booking::{Booking, BookingStatus},
        payment::{Payment, PaymentStatus},
        tour::TourListing,
        user::{ActiveStatus, User, UserRole},
    };
    use crate::repository::{memory::MemoryDb, Repository, UserStore};

    use super::StatsService;

    fn service(db: Arc<MemoryDb>) -> StatsService {
        StatsService::new(Repository::in_memory(db))
    }

    fn user(role: UserRole, is_active: ActiveStatus, days_ago: i64) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            role,
            is_active,
            created_at: Utc::now() - Duration::days(days_ago),
        }
    }

    fn tour(title: &str, category: &str, country: &str, city: &str, price: Decimal) -> TourListing {
        TourListing {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            category: category.to_string(),
            country: country.to_string(),
            city: city.to_string(),
            price,
            created_at: Utc::now(),
        }
    }

    fn booking(tour_id: Uuid, tourist_id: Uuid, guest_count: i32, days_ago: i64) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            tour_listing_id: tour_id,
            tourist_id,
            status: BookingStatus::Confirmed,
            guest_count,
            created_at: Utc::now() - Duration::days(days_ago),
        }
    }

    fn payment(status: PaymentStatus, amount: Decimal, gateway_status: Option<&str>) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            transaction_id: format!("tx-{}", Uuid::new_v4()),
            status,
            amount,
            gateway_status: gateway_status.map(String::from),
            created_at: Utc::now(),
        }
    }

    fn entry_value(entries: &[StatEntry], label: &str) -> Option<i64> {
        entries.iter().find(|e| e.label == label).map(|e| e.value)
    }

    #[tokio::test]
    async fn empty_stores_yield_zeroes_everywhere() {
        let svc = service(Arc::new(MemoryDb::default()));

        let users = svc.user_stats().await.unwrap();
        assert_eq!(users.total_users, 0);
        assert_eq!(users.total_active_users, 0);
        assert_eq!(users.new_users_last_7_days, 0);
        assert!(users.users_by_role.is_empty());

        let tours = svc.tour_stats().await.unwrap();
        assert_eq!(tours.total_tours, 0);
        assert_eq!(tours.average_price, Decimal::ZERO);
        assert!(tours.top_booked_tours.is_empty());
        assert!(tours.tours_by_category.is_empty());

        let bookings = svc.booking_stats().await.unwrap();
        assert_eq!(bookings.total_bookings, 0);
        assert_eq!(bookings.average_guest_count, Decimal::ZERO);
        assert_eq!(bookings.unique_booking_users, 0);
        assert!(bookings.top_booked_tours.is_empty());

        let payments = svc.payment_stats().await.unwrap();
        assert_eq!(payments.total_payments, 0);
        assert_eq!(payments.total_revenue, Decimal::ZERO);
        assert_eq!(payments.average_amount, Decimal::ZERO);
        assert!(payments.payments_by_gateway_status.is_empty());
    }

    #[tokio::test]
    async fn user_report_partitions_by_status_and_role() {
        let db = Arc::new(MemoryDb::default());
        {
            let mut users = db.users.write().await;
            users.push(user(UserRole::Tourist, ActiveStatus::Active, 1));
            users.push(user(UserRole::Tourist, ActiveStatus::Active, 10));
            users.push(user(UserRole::Guide, ActiveStatus::Inactive, 40));
            users.push(user(UserRole::Admin, ActiveStatus::Blocked, 3));
        }
        let stats = service(db).user_stats().await.unwrap();

        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.total_active_users, 2);
        assert_eq!(stats.total_inactive_users, 1);
        assert_eq!(stats.total_blocked_users, 1);
        assert_eq!(
            stats.total_active_users + stats.total_inactive_users + stats.total_blocked_users,
            stats.total_users
        );

        // Role groups partition the user set; absent roles never appear
        let by_role_sum: i64 = stats.users_by_role.iter().map(|e| e.value).sum();
        assert_eq!(by_role_sum, stats.total_users);
        assert_eq!(entry_value(&stats.users_by_role, "TOURIST"), Some(2));
        assert_eq!(entry_value(&stats.users_by_role, "GUIDE"), Some(1));
        assert_eq!(entry_value(&stats.users_by_role, "ADMIN"), Some(1));
        assert_eq!(entry_value(&stats.users_by_role, "SUPER_ADMIN"), None);
    }

    #[tokio::test]
    async fn rolling_windows_are_boundary_inclusive_and_monotonic() {
        let db = Arc::new(MemoryDb::default());
        {
            let mut users = db.users.write().await;
            users.push(user(UserRole::Tourist, ActiveStatus::Active, 0));
            // Just inside the 7-day window as seen from the later capture
            // of "now" inside the builder
            let mut edge = user(UserRole::Tourist, ActiveStatus::Active, 0);
            edge.created_at = Utc::now() - Duration::days(7) + Duration::seconds(30);
            users.push(edge);
            users.push(user(UserRole::Tourist, ActiveStatus::Active, 15));
            users.push(user(UserRole::Tourist, ActiveStatus::Active, 45));
        }
        let stats = service(db).user_stats().await.unwrap();

        assert_eq!(stats.new_users_last_7_days, 2);
        assert_eq!(stats.new_users_last_30_days, 3);
        assert!(stats.new_users_last_30_days >= stats.new_users_last_7_days);
    }

    #[tokio::test]
    async fn window_cutoff_is_inclusive_of_the_boundary_instant() {
        let db = Arc::new(MemoryDb::default());
        let mut boundary = user(UserRole::Tourist, ActiveStatus::Active, 0);
        let cutoff = boundary.created_at;
        db.users.write().await.push(boundary.clone());
        boundary.created_at = cutoff - Duration::seconds(1);
        boundary.id = Uuid::new_v4();
        db.users.write().await.push(boundary);

        let repository = Repository::in_memory(db);
        assert_eq!(repository.users.count_created_since(cutoff).await.unwrap(), 1);
        assert_eq!(
            repository
                .users
                .count_created_since(cutoff - Duration::seconds(2))
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn tour_report_groups_and_averages() {
        let db = Arc::new(MemoryDb::default());
        {
            let mut tours = db.tours.write().await;
            tours.push(tour("Old Dhaka Walk", "CITY", "Bangladesh", "Dhaka", dec!(50)));
            tours.push(tour("Sundarbans Cruise", "NATURE", "Bangladesh", "Khulna", dec!(250)));
            tours.push(tour("Sea Beach Trip", "NATURE", "Bangladesh", "Cox's Bazar", dec!(150)));
        }
        let stats = service(db).tour_stats().await.unwrap();

        assert_eq!(stats.total_tours, 3);
        assert_eq!(stats.average_price, dec!(150));
        assert_eq!(entry_value(&stats.tours_by_category, "NATURE"), Some(2));
        assert_eq!(entry_value(&stats.tours_by_category, "CITY"), Some(1));
        assert_eq!(entry_value(&stats.tours_by_country, "Bangladesh"), Some(3));

        let by_city_sum: i64 = stats.tours_by_city.iter().map(|e| e.value).sum();
        assert_eq!(by_city_sum, stats.total_tours);
    }

    #[tokio::test]
    async fn top_five_ranking_is_sorted_bounded_and_excludes_unbooked() {
        let db = Arc::new(MemoryDb::default());
        let mut tour_ids = Vec::new();
        {
            let mut tours = db.tours.write().await;
            for i in 0..7 {
                let t = tour(&format!("Tour {i}"), "CITY", "BD", "Dhaka", dec!(100));
                tour_ids.push(t.id);
                tours.push(t);
            }
        }
        {
            // Tour i receives i bookings; tour 0 is never booked
            let mut bookings = db.bookings.write().await;
            for (i, id) in tour_ids.iter().enumerate() {
                for _ in 0..i {
                    bookings.push(booking(*id, Uuid::new_v4(), 2, 1));
                }
            }
        }
        let stats = service(db).tour_stats().await.unwrap();

        assert_eq!(stats.top_booked_tours.len(), 5);
        assert!(stats
            .top_booked_tours
            .windows(2)
            .all(|w| w[0].booking_count >= w[1].booking_count));
        assert_eq!(stats.top_booked_tours[0].booking_count, 6);
        assert!(stats
            .top_booked_tours
            .iter()
            .all(|t| t.booking_count > 0 && t.tour_id != tour_ids[0]));
    }

    #[tokio::test]
    async fn ranking_drops_groups_referencing_deleted_tours() {
        let db = Arc::new(MemoryDb::default());
        let kept = tour("Kept Tour", "CITY", "BD", "Dhaka", dec!(80));
        let kept_id = kept.id;
        db.tours.write().await.push(kept);
        let deleted_id = Uuid::new_v4();
        {
            let mut bookings = db.bookings.write().await;
            // The dangling reference has more bookings than the kept tour
            for _ in 0..5 {
                bookings.push(booking(deleted_id, Uuid::new_v4(), 1, 1));
            }
            bookings.push(booking(kept_id, Uuid::new_v4(), 1, 1));
        }
        let svc = service(db);

        let tours = svc.tour_stats().await.unwrap();
        assert_eq!(tours.top_booked_tours.len(), 1);
        assert_eq!(tours.top_booked_tours[0].tour_id, kept_id);

        let bookings = svc.booking_stats().await.unwrap();
        assert_eq!(bookings.top_booked_tours.len(), 1);
        assert_eq!(bookings.top_booked_tours[0].tour_id, kept_id);
        assert_eq!(bookings.top_booked_tours[0].slug, "kept-tour");
    }

    #[tokio::test]
    async fn booking_report_counts_statuses_windows_and_distinct_tourists() {
        let db = Arc::new(MemoryDb::default());
        let t = tour("City Walk", "CITY", "BD", "Dhaka", dec!(60));
        let tour_id = t.id;
        db.tours.write().await.push(t);

        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        {
            let mut bookings = db.bookings.write().await;
            bookings.push(booking(tour_id, a, 2, 1));
            bookings.push(booking(tour_id, a, 4, 10));
            bookings.push(booking(tour_id, b, 1, 40));
            let mut cancelled = booking(tour_id, c, 3, 2);
            cancelled.status = BookingStatus::Cancelled;
            bookings.push(cancelled);
        }
        let stats = service(db).booking_stats().await.unwrap();

        assert_eq!(stats.total_bookings, 4);
        assert_eq!(entry_value(&stats.bookings_by_status, "CONFIRMED"), Some(3));
        assert_eq!(entry_value(&stats.bookings_by_status, "CANCELLED"), Some(1));
        let by_status_sum: i64 = stats.bookings_by_status.iter().map(|e| e.value).sum();
        assert_eq!(by_status_sum, stats.total_bookings);

        // bookings by users [a, a, b, c] means three distinct tourists
        assert_eq!(stats.unique_booking_users, 3);
        assert_eq!(stats.average_guest_count, dec!(2.5));
        assert_eq!(stats.bookings_last_7_days, 2);
        assert_eq!(stats.bookings_last_30_days, 3);
        assert!(stats.bookings_last_30_days >= stats.bookings_last_7_days);
        assert!(stats.top_booked_tours.len() <= 10);
    }

    #[tokio::test]
    async fn payment_report_revenue_is_paid_only_and_average_spans_all() {
        let db = Arc::new(MemoryDb::default());
        {
            let mut payments = db.payments.write().await;
            payments.push(payment(PaymentStatus::Paid, dec!(100), Some("SUCCESS")));
            payments.push(payment(PaymentStatus::Failed, dec!(50), None));
        }
        let stats = service(db).payment_stats().await.unwrap();

        assert_eq!(stats.total_payments, 2);
        assert_eq!(stats.total_revenue, dec!(100));
        assert_eq!(stats.average_amount, dec!(75));
        assert_eq!(entry_value(&stats.payments_by_status, "PAID"), Some(1));
        assert_eq!(entry_value(&stats.payments_by_status, "FAILED"), Some(1));
    }

    #[tokio::test]
    async fn missing_gateway_status_buckets_under_unknown() {
        let db = Arc::new(MemoryDb::default());
        {
            let mut payments = db.payments.write().await;
            payments.push(payment(PaymentStatus::Paid, dec!(10), Some("SUCCESS")));
            payments.push(payment(PaymentStatus::Unpaid, dec!(20), None));
        }
        let stats = service(db).payment_stats().await.unwrap();

        assert_eq!(
            entry_value(&stats.payments_by_gateway_status, "SUCCESS"),
            Some(1)
        );
        assert_eq!(
            entry_value(&stats.payments_by_gateway_status, "UNKNOWN"),
            Some(1)
        );
        let sum: i64 = stats
            .payments_by_gateway_status
            .iter()
            .map(|e| e.value)
            .sum();
        assert_eq!(sum, stats.total_payments);
    }

    #[tokio::test]
    async fn revenue_over_no_paid_payments_is_zero() {
        let db = Arc::new(MemoryDb::default());
        {
            let mut payments = db.payments.write().await;
            payments.push(payment(PaymentStatus::Failed, dec!(30), None));
            payments.push(payment(PaymentStatus::Cancelled, dec!(70), None));
        }
        let stats = service(db).payment_stats().await.unwrap();

        assert_eq!(stats.total_revenue, Decimal::ZERO);
        assert_eq!(stats.average_amount, dec!(50));
    }
}
