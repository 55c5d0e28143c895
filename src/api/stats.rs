//! Statistics endpoints

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;

/// One group of a grouped count (role, status, category, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatEntry {
    /// Group label
    pub label: String,
    /// Number of records in the group
    pub value: i64,
}

/// Ranked tour with the price/city projection, used by the tour report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopBookedTour {
    pub tour_id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub city: String,
    pub booking_count: i64,
}

/// Ranked tour with the title/slug projection, used by the booking report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookedTourRank {
    pub tour_id: Uuid,
    pub title: String,
    pub slug: String,
    pub booking_count: i64,
}

/// User statistics report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserStatsResponse {
    pub total_users: i64,
    pub total_active_users: i64,
    pub total_inactive_users: i64,
    pub total_blocked_users: i64,
    pub new_users_last_7_days: i64,
    pub new_users_last_30_days: i64,
    /// One entry per role value present in the data
    pub users_by_role: Vec<StatEntry>,
}

/// Tour statistics report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TourStatsResponse {
    pub total_tours: i64,
    pub tours_by_category: Vec<StatEntry>,
    pub tours_by_country: Vec<StatEntry>,
    pub tours_by_city: Vec<StatEntry>,
    /// Mean listing price, 0 when there are no listings
    pub average_price: Decimal,
    /// Up to five most-booked tours, most booked first
    pub top_booked_tours: Vec<TopBookedTour>,
}

/// Booking statistics report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingStatsResponse {
    pub total_bookings: i64,
    pub bookings_by_status: Vec<StatEntry>,
    /// Up to ten most-booked tours, most booked first
    pub top_booked_tours: Vec<BookedTourRank>,
    /// Mean guest count per booking, 0 when there are no bookings
    pub average_guest_count: Decimal,
    pub bookings_last_7_days: i64,
    pub bookings_last_30_days: i64,
    /// Number of distinct tourists that have ever booked
    pub unique_booking_users: i64,
}

/// Payment statistics report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentStatsResponse {
    pub total_payments: i64,
    pub payments_by_status: Vec<StatEntry>,
    /// Sum of amounts over PAID payments, 0 when there are none
    pub total_revenue: Decimal,
    /// Mean amount over all payments regardless of status
    pub average_amount: Decimal,
    /// Payments per gateway status, missing gateway data bucketed as UNKNOWN
    pub payments_by_gateway_status: Vec<StatEntry>,
}

/// Get user statistics
#[utoipa::path(
    get,
    path = "/stats/users",
    tag = "stats",
    responses(
        (status = 200, description = "User statistics", body = UserStatsResponse)
    )
)]
pub async fn get_user_stats(
    State(state): State<crate::AppState>,
) -> AppResult<Json<UserStatsResponse>> {
    Ok(Json(state.services.stats.user_stats().await?))
}

/// Get tour statistics
#[utoipa::path(
    get,
    path = "/stats/tours",
    tag = "stats",
    responses(
        (status = 200, description = "Tour statistics", body = TourStatsResponse)
    )
)]
pub async fn get_tour_stats(
    State(state): State<crate::AppState>,
) -> AppResult<Json<TourStatsResponse>> {
    Ok(Json(state.services.stats.tour_stats().await?))
}

/// Get booking statistics
#[utoipa::path(
    get,
    path = "/stats/bookings",
    tag = "stats",
    responses(
        (status = 200, description = "Booking statistics", body = BookingStatsResponse)
    )
)]
pub async fn get_booking_stats(
    State(state): State<crate::AppState>,
) -> AppResult<Json<BookingStatsResponse>> {
    Ok(Json(state.services.stats.booking_stats().await?))
}

/// Get payment statistics
#[utoipa::path(
    get,
    path = "/stats/payments",
    tag = "stats",
    responses(
        (status = 200, description = "Payment statistics", body = PaymentStatsResponse)
    )
)]
pub async fn get_payment_stats(
    State(state): State<crate::AppState>,
) -> AppResult<Json<PaymentStatsResponse>> {
    Ok(Json(state.services.stats.payment_stats().await?))
}
