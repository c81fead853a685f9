use chrono::{DateTime, NaiveDate, Utc};
use globetrail_core::{Document, Fields};
use globetrail_shared::{BookingCreatedEvent, Masked};
use serde::{Deserialize, Serialize};

/// Stored in place of an e-mail for identities that have none.
pub const UNKNOWN_EMAIL: &str = "unknown";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Booking status. Bookings are created confirmed and never transition;
/// cancelling removes the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    #[default]
    Confirmed,
}

/// A customer's booking of one package.
///
/// Title, per-person price and location are copied from the package so the
/// record stays readable after the package is edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub package_id: String,
    pub package_title: String,
    pub price_per_person: f64,
    pub total_price: f64,
    pub date: NaiveDate,
    pub guests: u32,
    pub location: String,
    pub user_id: String,
    pub user_email: String,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn to_fields(&self) -> Result<Fields, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(fields) => Ok(fields),
            _ => Ok(Fields::new()),
        }
    }

    pub fn created_event(&self, booking_id: &str) -> BookingCreatedEvent {
        BookingCreatedEvent {
            booking_id: booking_id.to_string(),
            package_id: self.package_id.clone(),
            user_id: self.user_id.clone(),
            user_email: Masked(self.user_email.clone()),
            guests: self.guests,
            total_price: self.total_price,
            timestamp: self.created_at.timestamp(),
        }
    }
}

/// A persisted booking together with its document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: String,
    #[serde(flatten)]
    pub booking: Booking,
}

impl BookingRecord {
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        let booking = serde_json::from_value(serde_json::Value::Object(doc.data))?;
        Ok(Self { id: doc.id, booking })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn booking() -> Booking {
        Booking {
            package_id: "1".to_string(),
            package_title: "Charming Paris".to_string(),
            price_per_person: 95000.0,
            total_price: 285000.0,
            date: NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
            guests: 3,
            location: "Paris, France".to_string(),
            user_id: "u-1".to_string(),
            user_email: "ana@example.com".to_string(),
            status: BookingStatus::Confirmed,
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_document_shape() {
        let fields = booking().to_fields().unwrap();
        assert_eq!(fields["packageId"], json!("1"));
        assert_eq!(fields["pricePerPerson"], json!(95000.0));
        assert_eq!(fields["totalPrice"], json!(285000.0));
        assert_eq!(fields["date"], json!("2026-12-24"));
        assert_eq!(fields["status"], json!("Confirmed"));
        assert_eq!(fields["userEmail"], json!("ana@example.com"));
    }

    #[test]
    fn test_record_from_document() {
        let doc = Document::new("bk-9", booking().to_fields().unwrap());
        let record = BookingRecord::from_document(doc).unwrap();
        assert_eq!(record.id, "bk-9");
        assert_eq!(record.booking, booking());
    }

    #[test]
    fn test_created_event_masks_email() {
        let event = booking().created_event("bk-1");
        assert_eq!(event.total_price, 285000.0);
        assert_eq!(format!("{}", event.user_email), "********");
    }
}
