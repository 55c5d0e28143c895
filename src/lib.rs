//! Crazy Tours Analytics & Reporting Server
//!
//! REST JSON API aggregating the operational data of a tour-booking
//! platform (users, tour listings, bookings, payments) into summary
//! statistics, and rendering PDF invoices for paid bookings.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
