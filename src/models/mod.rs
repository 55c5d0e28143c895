//! Data models for Crazy Tours

pub mod booking;
pub mod payment;
pub mod tour;
pub mod user;

// Re-export commonly used types
pub use booking::{Booking, BookingStatus, InvoiceRecord};
pub use payment::{Payment, PaymentStatus};
pub use tour::TourListing;
pub use user::{ActiveStatus, User, UserRole};
