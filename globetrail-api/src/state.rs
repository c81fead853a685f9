use globetrail_core::{AuthProvider, CollectionPath, DocumentStore};
use globetrail_shared::BookingCreatedEvent;
use globetrail_store::{
    BookingRepository, CatalogStore, ContentRepository, MemoryAuthProvider, MemoryDocumentStore,
    ObjectStoreUploader, RedisClient,
};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub admin_emails: Vec<String>,
}

impl AuthConfig {
    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

#[derive(Clone)]
pub struct RateLimit {
    pub redis: Arc<RedisClient>,
    pub requests_per_minute: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub catalog: Arc<CatalogStore>,
    pub bookings: BookingRepository,
    pub content: ContentRepository,
    pub auth_provider: Arc<dyn AuthProvider>,
    pub uploader: Arc<ObjectStoreUploader>,
    pub rate_limit: Option<RateLimit>,
    pub booking_tx: broadcast::Sender<BookingCreatedEvent>,
    pub auth: AuthConfig,
    pub app_id: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<CatalogStore>,
        auth_provider: Arc<dyn AuthProvider>,
        uploader: Arc<ObjectStoreUploader>,
        auth: AuthConfig,
        app_id: impl Into<String>,
    ) -> Self {
        let (booking_tx, _) = broadcast::channel(100);
        Self {
            bookings: BookingRepository::new(store.clone()),
            content: ContentRepository::new(store.clone()),
            store,
            catalog,
            auth_provider,
            uploader,
            rate_limit: None,
            booking_tx,
            auth,
            app_id: app_id.into(),
        }
    }

    /// Everything in process memory, the catalog read from `packages`.
    pub fn in_memory(auth: AuthConfig, app_id: impl Into<String>) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let catalog = Arc::new(CatalogStore::from_collection(
            store.clone(),
            CollectionPath::new("packages"),
        ));
        Self::new(
            store,
            catalog,
            Arc::new(MemoryAuthProvider::new()),
            Arc::new(ObjectStoreUploader::in_memory(
                "http://localhost:8080/media",
                5 * 1024 * 1024,
            )),
            auth,
            app_id,
        )
    }
}
