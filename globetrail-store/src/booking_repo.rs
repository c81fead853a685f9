use globetrail_core::{CollectionPath, CoreError, CoreResult, DocumentStore, StoreError};
use globetrail_order::{Booking, BookingHistory, BookingRecord};
use globetrail_shared::Masked;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub const BOOKINGS_COLLECTION: &str = "bookings";

/// Persists composed bookings in the `bookings` collection.
#[derive(Clone)]
pub struct BookingRepository {
    store: Arc<dyn DocumentStore>,
    collection: CollectionPath,
}

impl BookingRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            collection: CollectionPath::new(BOOKINGS_COLLECTION),
        }
    }

    pub async fn create(&self, booking: &Booking) -> CoreResult<String> {
        let fields = booking
            .to_fields()
            .map_err(|e| CoreError::Persistence(StoreError::Serialization(e)))?;
        let id = self
            .store
            .create(&self.collection, fields)
            .await
            .map_err(CoreError::Persistence)?;

        info!(
            "Booking {} created for {} ({} guests, total {})",
            id,
            Masked(booking.user_email.clone()),
            booking.guests,
            booking.total_price
        );
        Ok(id)
    }

    /// The user's bookings, newest first. Records that no longer parse are
    /// skipped.
    pub async fn list_for_user(&self, user_id: &str) -> CoreResult<BookingHistory> {
        let documents = self
            .store
            .read_where(&self.collection, "userId", &Value::String(user_id.to_string()))
            .await
            .map_err(|e| CoreError::fetch(&self.collection, e))?;

        let records = documents
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                match BookingRecord::from_document(doc) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("Skipping malformed booking {}: {}", id, e);
                        None
                    }
                }
            })
            .collect();

        Ok(BookingHistory::new(records))
    }

    pub async fn get(&self, id: &str) -> CoreResult<Option<BookingRecord>> {
        let doc = self
            .store
            .read_one(&self.collection, id)
            .await
            .map_err(|e| CoreError::fetch(&self.collection, e))?;

        doc.map(BookingRecord::from_document)
            .transpose()
            .map_err(|e| CoreError::fetch(&self.collection, StoreError::Serialization(e)))
    }

    /// Cancels a booking by removing its record.
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        self.store
            .delete(&self.collection, id)
            .await
            .map_err(CoreError::Persistence)?;
        info!("Booking {} cancelled", id);
        Ok(())
    }
}
