use crate::models::BookingRecord;

/// A user's bookings as the dashboard shows them, newest first.
#[derive(Debug, Clone, Default)]
pub struct BookingHistory {
    records: Vec<BookingRecord>,
}

/// A booking taken out of the list ahead of its delete, so it can be put
/// back where it was if the delete fails.
#[derive(Debug, Clone)]
pub struct PendingCancellation {
    index: usize,
    pub record: BookingRecord,
}

impl BookingHistory {
    pub fn new(mut records: Vec<BookingRecord>) -> Self {
        records.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
        Self { records }
    }

    pub fn records(&self) -> &[BookingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&BookingRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Removes a booking locally.
    pub fn take(&mut self, id: &str) -> Option<PendingCancellation> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let record = self.records.remove(index);
        Some(PendingCancellation { index, record })
    }

    /// Puts a taken booking back at its old position.
    pub fn restore(&mut self, pending: PendingCancellation) {
        let index = pending.index.min(self.records.len());
        self.records.insert(index, pending.record);
    }
}
