pub mod composer;
pub mod history;
pub mod models;

pub use composer::{compose, BookingError};
pub use history::{BookingHistory, PendingCancellation};
pub use models::{Booking, BookingRecord, BookingStatus};
