//! Tour listing model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Tour listing published by a guide
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TourListing {
    pub id: Uuid,
    pub title: String,
    /// URL-friendly identifier derived from the title
    pub slug: String,
    pub category: String,
    pub country: String,
    pub city: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}
