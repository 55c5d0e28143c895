//! API handlers for the Crazy Tours REST endpoints

pub mod bookings;
pub mod health;
pub mod openapi;
pub mod stats;
