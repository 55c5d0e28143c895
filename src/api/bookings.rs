//! Booking endpoints

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::error::AppResult;

/// Download the PDF invoice for a paid booking
#[utoipa::path(
    get,
    path = "/bookings/{id}/invoice",
    tag = "bookings",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Invoice document", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Booking not found or not paid")
    )
)]
pub async fn get_booking_invoice(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let bytes = state.services.invoices.booking_invoice(id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"invoice-{}.pdf\"", id),
            ),
        ],
        bytes,
    ))
}
