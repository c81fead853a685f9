use serde::{Deserialize, Serialize};

use crate::pii::Masked;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingCreatedEvent {
    pub booking_id: String,
    pub package_id: String,
    pub user_id: String,
    pub user_email: Masked<String>,
    pub guests: u32,
    pub total_price: f64,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingCancelledEvent {
    pub booking_id: String,
    pub user_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogRefreshedEvent {
    pub collection: String,
    pub package_count: usize,
    pub failed: bool,
    pub timestamp: i64,
}

impl CatalogRefreshedEvent {
    pub fn now(collection: impl Into<String>, package_count: usize, failed: bool) -> Self {
        Self {
            collection: collection.into(),
            package_count,
            failed,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_event_keeps_email_in_payload() {
        let event = BookingCreatedEvent {
            booking_id: "b-1".to_string(),
            package_id: "3".to_string(),
            user_id: "u-1".to_string(),
            user_email: Masked("traveler@example.com".to_string()),
            guests: 2,
            total_price: 190000.0,
            timestamp: 0,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["user_email"], "traveler@example.com");
        assert!(!format!("{:?}", event).contains("traveler@example.com"));
    }
}
