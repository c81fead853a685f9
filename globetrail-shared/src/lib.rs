pub mod models;
pub mod pii;

pub use models::events::{BookingCancelledEvent, BookingCreatedEvent, CatalogRefreshedEvent};
pub use pii::Masked;
