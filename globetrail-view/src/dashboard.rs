use globetrail_core::{AuthSession, Identity};
use globetrail_order::BookingHistory;
use globetrail_store::BookingRepository;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::{update_if_alive, Shared, ViewError};

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub identity: Option<Identity>,
    pub history: BookingHistory,
    pub loading: bool,
    pub error: Option<String>,
    /// Set when the page was opened without a session.
    pub needs_authentication: bool,
}

/// "My trips" page: the signed-in user's bookings and profile.
pub struct DashboardController {
    bookings: BookingRepository,
    session: Arc<AuthSession>,
    state: Shared<DashboardState>,
}

impl DashboardController {
    pub fn new(bookings: BookingRepository, session: Arc<AuthSession>) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            bookings,
            session,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn load(&self) -> JoinHandle<()> {
        let identity = self.session.current_identity();
        let state = Arc::downgrade(&self.state);

        let Some(identity) = identity else {
            self.state.send_modify(|s| {
                *s = DashboardState {
                    needs_authentication: true,
                    ..DashboardState::default()
                };
            });
            return tokio::spawn(async {});
        };

        self.state.send_modify(|s| {
            s.identity = Some(identity.clone());
            s.needs_authentication = false;
            s.loading = true;
            s.error = None;
        });

        let bookings = self.bookings.clone();
        tokio::spawn(async move {
            let result = bookings.list_for_user(&identity.uid).await;
            update_if_alive(&state, |s| {
                s.loading = false;
                match result {
                    Ok(history) => s.history = history,
                    Err(e) => {
                        s.history = BookingHistory::default();
                        s.error = Some(e.to_string());
                    }
                }
            });
        })
    }

    /// Removes the booking from the list at once, then deletes it. A failed
    /// delete puts the booking back where it was.
    pub async fn cancel(&self, booking_id: &str) -> Result<(), ViewError> {
        let mut pending = None;
        self.state.send_modify(|s| {
            pending = s.history.take(booking_id);
            s.error = None;
        });
        let pending = pending.ok_or_else(|| ViewError::NotFound(booking_id.to_string()))?;

        match self.bookings.delete(booking_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Cancelling booking {} failed, restoring it: {}", booking_id, e);
                self.state.send_modify(|s| {
                    s.history.restore(pending);
                    s.error = Some(e.to_string());
                });
                Err(e.into())
            }
        }
    }

    pub async fn update_display_name(&self, name: &str) -> Result<Identity, ViewError> {
        let identity = self.session.update_display_name(name).await?;
        self.state.send_modify(|s| s.identity = Some(identity.clone()));
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use globetrail_catalog::Package;
    use globetrail_core::{
        CollectionPath, Document, DocumentStore, DocumentStream, Fields, StoreError,
    };
    use globetrail_order::compose;
    use globetrail_store::{MemoryAuthProvider, MemoryDocumentStore};

    async fn signed_in() -> (Arc<AuthSession>, Identity) {
        let session = Arc::new(AuthSession::new(Arc::new(MemoryAuthProvider::new())));
        let identity = session.sign_up("ana@example.com", "secret1").await.unwrap();
        (session, identity)
    }

    async fn book(repo: &BookingRepository, identity: &Identity, hour: u32) -> String {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0).unwrap();
        let pkg = Package::new("5", "Venice", 70000.0);
        let booking = compose(&pkg, "2026-12-01", 2, Some(identity), now).unwrap();
        repo.create(&booking).await.unwrap()
    }

    fn ids(state: &DashboardState) -> Vec<String> {
        state.history.records().iter().map(|r| r.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_signed_out_needs_authentication() {
        let session = Arc::new(AuthSession::new(Arc::new(MemoryAuthProvider::new())));
        let repo = BookingRepository::new(Arc::new(MemoryDocumentStore::new()));
        let controller = DashboardController::new(repo, session);
        controller.load().await.unwrap();
        assert!(controller.state().needs_authentication);
    }

    #[tokio::test]
    async fn test_lists_newest_first_and_cancels() {
        let (session, identity) = signed_in().await;
        let repo = BookingRepository::new(Arc::new(MemoryDocumentStore::new()));
        let first = book(&repo, &identity, 8).await;
        let second = book(&repo, &identity, 10).await;

        let controller = DashboardController::new(repo.clone(), session);
        controller.load().await.unwrap();
        assert_eq!(ids(&controller.state()), vec![second.clone(), first.clone()]);

        controller.cancel(&second).await.unwrap();
        assert_eq!(ids(&controller.state()), vec![first]);
        assert!(repo.get(&second).await.unwrap().is_none());

        assert!(matches!(
            controller.cancel("missing").await,
            Err(ViewError::NotFound(_))
        ));
    }

    /// Reads from a real store, refuses deletes.
    struct NoDeletes(MemoryDocumentStore);

    #[async_trait]
    impl DocumentStore for NoDeletes {
        async fn read_all(&self, c: &CollectionPath) -> Result<Vec<Document>, StoreError> {
            self.0.read_all(c).await
        }
        async fn read_one(
            &self,
            c: &CollectionPath,
            id: &str,
        ) -> Result<Option<Document>, StoreError> {
            self.0.read_one(c, id).await
        }
        async fn create(&self, c: &CollectionPath, d: Fields) -> Result<String, StoreError> {
            self.0.create(c, d).await
        }
        async fn set(&self, c: &CollectionPath, id: &str, d: Fields) -> Result<(), StoreError> {
            self.0.set(c, id, d).await
        }
        async fn update(&self, c: &CollectionPath, id: &str, p: Fields) -> Result<(), StoreError> {
            self.0.update(c, id, p).await
        }
        async fn delete(&self, _c: &CollectionPath, _id: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("permission denied".to_string()))
        }
        async fn subscribe(&self, c: &CollectionPath) -> Result<DocumentStream, StoreError> {
            self.0.subscribe(c).await
        }
    }

    #[tokio::test]
    async fn test_failed_cancel_restores_position() {
        let (session, identity) = signed_in().await;
        let repo = BookingRepository::new(Arc::new(NoDeletes(MemoryDocumentStore::new())));
        let a = book(&repo, &identity, 8).await;
        let b = book(&repo, &identity, 9).await;
        let c = book(&repo, &identity, 10).await;

        let controller = DashboardController::new(repo, session);
        controller.load().await.unwrap();

        let err = controller.cancel(&b).await.unwrap_err();
        assert!(matches!(err, ViewError::Core(globetrail_core::CoreError::Persistence(_))));

        let state = controller.state();
        assert_eq!(ids(&state), vec![c, b, a]);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn test_update_display_name() {
        let (session, _) = signed_in().await;
        let repo = BookingRepository::new(Arc::new(MemoryDocumentStore::new()));
        let controller = DashboardController::new(repo, session);
        controller.load().await.unwrap();

        controller.update_display_name("Ana").await.unwrap();
        assert_eq!(controller.state().identity.unwrap().greeting_name(), "Ana");
    }
}
