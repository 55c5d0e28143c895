//! Booking model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Failed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Booking of a tour listing by a tourist
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub tour_listing_id: Uuid,
    pub tourist_id: Uuid,
    pub status: BookingStatus,
    pub guest_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Flattened billing data for one completed booking, consumed by the
/// invoice renderer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceRecord {
    pub transaction_id: String,
    pub booking_date: DateTime<Utc>,
    pub user_name: String,
    pub tour_title: String,
    pub guest_count: i32,
    pub total_amount: Decimal,
}
