use chrono::{DateTime, Utc};
use globetrail_catalog::{parse_guests, GuestCountError, Package, Quote};
use globetrail_core::AuthSession;
use globetrail_order::{compose, BookingError};
use globetrail_shared::BookingCreatedEvent;
use globetrail_store::{BookingRepository, CatalogStore};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::{update_if_alive, Shared, ViewError};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailPhase {
    Browsing,
    BookingForm,
    Submitting,
    Booked { id: String },
}

/// Outcome of pressing "Book now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookAction {
    OpenForm,
    /// No identity: send the user to sign in instead.
    NeedsAuthentication,
}

#[derive(Debug, Clone)]
pub struct DetailState {
    pub package: Option<Package>,
    pub loading: bool,
    pub not_found: bool,
    pub phase: DetailPhase,
    pub date: String,
    /// Raw guest-count text as typed.
    pub guest_input: String,
    /// Last valid guest count; the quote always reflects it.
    pub guests: u32,
    pub guest_error: Option<GuestCountError>,
    pub quote: Option<Quote>,
    pub error: Option<String>,
}

impl Default for DetailState {
    fn default() -> Self {
        Self {
            package: None,
            loading: false,
            not_found: false,
            phase: DetailPhase::Browsing,
            date: String::new(),
            guest_input: "1".to_string(),
            guests: 1,
            guest_error: None,
            quote: None,
            error: None,
        }
    }
}

impl DetailState {
    pub fn can_submit(&self) -> bool {
        self.package.is_some()
            && self.guest_error.is_none()
            && !self.date.trim().is_empty()
            && self.phase == DetailPhase::BookingForm
    }
}

/// Package detail page and its booking form.
pub struct DetailController {
    catalog: Arc<CatalogStore>,
    bookings: BookingRepository,
    session: Arc<AuthSession>,
    events: broadcast::Sender<BookingCreatedEvent>,
    state: Shared<DetailState>,
}

impl DetailController {
    pub fn new(
        catalog: Arc<CatalogStore>,
        bookings: BookingRepository,
        session: Arc<AuthSession>,
        events: broadcast::Sender<BookingCreatedEvent>,
    ) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            catalog,
            bookings,
            session,
            events,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Resolves the package from the current snapshot, refreshing the catalog
    /// once if it is not there yet.
    pub fn load(&self, package_id: &str) -> JoinHandle<()> {
        self.state.send_modify(|s| {
            *s = DetailState {
                loading: true,
                ..DetailState::default()
            };
        });

        let catalog = self.catalog.clone();
        let state = Arc::downgrade(&self.state);
        let package_id = package_id.to_string();
        tokio::spawn(async move {
            let found = match catalog.find(&package_id) {
                Some(pkg) => Some(pkg),
                None => {
                    catalog.refresh().await;
                    catalog.find(&package_id)
                }
            };
            let error = catalog.last_error();
            update_if_alive(&state, |s| {
                s.loading = false;
                s.not_found = found.is_none();
                s.quote = found.as_ref().map(|pkg| Quote::new(pkg.price, s.guests));
                s.package = found;
                s.error = error;
            });
        })
    }

    pub fn book_clicked(&self) -> BookAction {
        if self.session.current_identity().is_none() {
            return BookAction::NeedsAuthentication;
        }
        self.state.send_modify(|s| {
            if s.package.is_some() {
                s.phase = DetailPhase::BookingForm;
            }
        });
        BookAction::OpenForm
    }

    pub fn close_form(&self) {
        self.state.send_modify(|s| {
            s.phase = DetailPhase::Browsing;
            s.error = None;
        });
    }

    pub fn set_date(&self, date: &str) {
        let date = date.to_string();
        self.state.send_modify(|s| s.date = date);
    }

    /// Re-prices on every keystroke. Invalid input is flagged and leaves the
    /// quote at the last valid count.
    pub fn set_guests(&self, input: &str) {
        let parsed = parse_guests(input);
        let input = input.to_string();
        self.state.send_modify(|s| {
            s.guest_input = input;
            match parsed {
                Ok(guests) => {
                    s.guests = guests;
                    s.guest_error = None;
                    s.quote = s.package.as_ref().map(|pkg| Quote::new(pkg.price, guests));
                }
                Err(e) => s.guest_error = Some(e),
            }
        });
    }

    /// Validates, composes and persists the booking. Only accepted while the
    /// form is open; the phase moves to `Submitting` before anything else, so
    /// a second call during or after submission is refused.
    pub async fn submit(&self, now: DateTime<Utc>) -> Result<String, ViewError> {
        let mut claimed = None;
        self.state.send_if_modified(|s| {
            if s.phase != DetailPhase::BookingForm {
                return false;
            }
            s.phase = DetailPhase::Submitting;
            claimed = Some(s.clone());
            true
        });
        let Some(snapshot) = claimed else {
            return Err(ViewError::FormClosed);
        };

        let pkg = match snapshot.package {
            Some(pkg) => pkg,
            None => {
                self.reopen_form(None);
                return Err(ViewError::NotFound("package".to_string()));
            }
        };

        if let Some(e) = snapshot.guest_error {
            let err = BookingError::InvalidGuestCount(e);
            self.reopen_form(Some(err.to_string()));
            return Err(err.into());
        }

        let identity = self.session.current_identity();
        let guests = i64::from(snapshot.guests);
        let booking = match compose(&pkg, &snapshot.date, guests, identity.as_ref(), now) {
            Ok(booking) => booking,
            Err(BookingError::Unauthenticated) => {
                self.reopen_form(None);
                return Err(ViewError::NeedsAuthentication);
            }
            Err(e) => {
                self.reopen_form(Some(e.to_string()));
                return Err(e.into());
            }
        };

        self.state.send_modify(|s| s.error = None);

        match self.bookings.create(&booking).await {
            Ok(id) => {
                info!("Booked package {} as {}", pkg.id, id);
                let _ = self.events.send(booking.created_event(&id));
                self.state.send_modify(|s| s.phase = DetailPhase::Booked { id: id.clone() });
                Ok(id)
            }
            Err(e) => {
                error!("Booking for package {} failed: {}", pkg.id, e);
                self.reopen_form(Some(e.to_string()));
                Err(e.into())
            }
        }
    }

    fn reopen_form(&self, error: Option<String>) {
        self.state.send_modify(|s| {
            s.phase = DetailPhase::BookingForm;
            s.error = error;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use globetrail_core::{CollectionPath, DocumentStore};
    use globetrail_store::{MemoryAuthProvider, MemoryDocumentStore};

    struct Harness {
        controller: DetailController,
        session: Arc<AuthSession>,
        store: Arc<MemoryDocumentStore>,
        events: broadcast::Receiver<BookingCreatedEvent>,
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryDocumentStore::new());
        let session = Arc::new(AuthSession::new(Arc::new(MemoryAuthProvider::new())));
        let (tx, events) = broadcast::channel(8);
        let controller = DetailController::new(
            Arc::new(CatalogStore::static_seed()),
            BookingRepository::new(store.clone()),
            session.clone(),
            tx,
        );
        controller.load("1").await.unwrap();
        Harness {
            controller,
            session,
            store,
            events,
        }
    }

    #[tokio::test]
    async fn test_load_missing_package() {
        let h = harness().await;
        h.controller.load("404").await.unwrap();
        let state = h.controller.state();
        assert!(state.not_found);
        assert!(state.package.is_none());
    }

    #[tokio::test]
    async fn test_book_requires_identity() {
        let h = harness().await;
        assert_eq!(h.controller.book_clicked(), BookAction::NeedsAuthentication);
        assert_eq!(h.controller.state().phase, DetailPhase::Browsing);

        h.session.sign_in_anonymously().await.unwrap();
        assert_eq!(h.controller.book_clicked(), BookAction::OpenForm);
        assert_eq!(h.controller.state().phase, DetailPhase::BookingForm);
    }

    #[tokio::test]
    async fn test_quote_tracks_last_valid_guest_count() {
        let h = harness().await;
        h.controller.set_guests("3");
        assert_eq!(h.controller.state().quote.unwrap().total, 285000.0);

        h.controller.set_guests("21");
        let state = h.controller.state();
        assert!(state.guest_error.is_some());
        assert_eq!(state.quote.unwrap().total, 285000.0);

        h.controller.set_guests("abc");
        assert!(matches!(
            h.controller.state().guest_error,
            Some(GuestCountError::NotANumber(_))
        ));

        h.controller.set_guests("2");
        let state = h.controller.state();
        assert!(state.guest_error.is_none());
        assert_eq!(state.quote.unwrap().total, 190000.0);
    }

    #[tokio::test]
    async fn test_submit_persists_and_broadcasts() {
        let mut h = harness().await;
        h.session.sign_up("ana@example.com", "secret1").await.unwrap();
        h.controller.book_clicked();
        h.controller.set_date("2026-11-02");
        h.controller.set_guests("3");
        assert!(h.controller.state().can_submit());

        let id = h.controller.submit(now()).await.unwrap();
        assert_eq!(h.controller.state().phase, DetailPhase::Booked { id: id.clone() });

        let doc = h.store.read_one(&CollectionPath::new("bookings"), &id).await.unwrap().unwrap();
        assert_eq!(doc.get("totalPrice"), Some(&serde_json::json!(285000.0)));

        let event = h.events.recv().await.unwrap();
        assert_eq!(event.booking_id, id);
        assert_eq!(event.guests, 3);
    }

    #[tokio::test]
    async fn test_past_date_creates_nothing() {
        let h = harness().await;
        h.session.sign_in_anonymously().await.unwrap();
        h.controller.book_clicked();
        h.controller.set_date("2026-10-18");

        let err = h.controller.submit(now()).await.unwrap_err();
        assert!(matches!(err, ViewError::Booking(BookingError::InvalidDate(_))));
        assert!(h.controller.state().error.is_some());
        assert_eq!(h.controller.state().phase, DetailPhase::BookingForm);
        assert!(h.store.read_all(&CollectionPath::new("bookings")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_guest_input_blocks_submit() {
        let h = harness().await;
        h.session.sign_in_anonymously().await.unwrap();
        h.controller.book_clicked();
        h.controller.set_date("2026-11-02");
        h.controller.set_guests("0");
        assert!(!h.controller.state().can_submit());

        let err = h.controller.submit(now()).await.unwrap_err();
        assert!(matches!(err, ViewError::Booking(BookingError::InvalidGuestCount(_))));
    }

    #[tokio::test]
    async fn test_signed_out_submit_needs_authentication() {
        let h = harness().await;
        h.session.sign_in_anonymously().await.unwrap();
        h.controller.book_clicked();
        h.controller.set_date("2026-11-02");
        h.session.sign_out();

        let err = h.controller.submit(now()).await.unwrap_err();
        assert!(matches!(err, ViewError::NeedsAuthentication));
        assert_eq!(h.controller.state().phase, DetailPhase::BookingForm);
    }

    #[tokio::test]
    async fn test_submit_requires_open_form() {
        let h = harness().await;
        h.session.sign_in_anonymously().await.unwrap();
        h.controller.set_date("2026-11-02");
        let err = h.controller.submit(now()).await.unwrap_err();
        assert!(matches!(err, ViewError::FormClosed));
        assert!(h.store.read_all(&CollectionPath::new("bookings")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_submit_does_not_book_twice() {
        let h = harness().await;
        h.session.sign_in_anonymously().await.unwrap();
        h.controller.book_clicked();
        h.controller.set_date("2026-11-02");

        let id = h.controller.submit(now()).await.unwrap();
        let err = h.controller.submit(now()).await.unwrap_err();
        assert!(matches!(err, ViewError::FormClosed));
        assert_eq!(h.controller.state().phase, DetailPhase::Booked { id });

        let stored = h.store.read_all(&CollectionPath::new("bookings")).await.unwrap();
        assert_eq!(stored.len(), 1);
    }
}
