//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, health, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Crazy Tours API",
        version = "1.0.0",
        description = "Tour booking analytics and reporting REST API",
        contact(name = "Crazy Tours Team", email = "info@crazytours.com")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Stats
        stats::get_user_stats,
        stats::get_tour_stats,
        stats::get_booking_stats,
        stats::get_payment_stats,
        // Bookings
        bookings::get_booking_invoice,
    ),
    components(
        schemas(
            // Stats
            stats::StatEntry,
            stats::TopBookedTour,
            stats::BookedTourRank,
            stats::UserStatsResponse,
            stats::TourStatsResponse,
            stats::BookingStatsResponse,
            stats::PaymentStatsResponse,
            // Models
            crate::models::user::User,
            crate::models::user::UserRole,
            crate::models::user::ActiveStatus,
            crate::models::tour::TourListing,
            crate::models::booking::Booking,
            crate::models::booking::BookingStatus,
            crate::models::booking::InvoiceRecord,
            crate::models::payment::Payment,
            crate::models::payment::PaymentStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "stats", description = "Statistics reports"),
        (name = "bookings", description = "Booking documents")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
