pub mod admin;
pub mod auth;
pub mod bookings;
pub mod content;
pub mod health;
pub mod media;
pub mod packages;
pub mod showcase;
