pub mod app_config;
pub mod auth;
pub mod booking_repo;
pub mod catalog_repo;
pub mod content_repo;
pub mod database;
pub mod memory;
pub mod postgres;
pub mod redis_repo;
pub mod seed;
pub mod uploads;

pub use app_config::{CatalogSourceKind, Config, StoreBackend};
pub use auth::MemoryAuthProvider;
pub use booking_repo::BookingRepository;
pub use catalog_repo::{normalize_document, CatalogSource, CatalogState, CatalogStore};
pub use content_repo::ContentRepository;
pub use database::DbClient;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use redis_repo::RedisClient;
pub use seed::{seed_all, SeedReport};
pub use uploads::ObjectStoreUploader;

use globetrail_core::{CollectionPath, DocumentStore, StoreError};
use std::sync::Arc;

/// Opens the configured document store, running migrations for Postgres.
pub async fn open_document_store(config: &Config) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory document store");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let url = config
                .database
                .as_ref()
                .map(|db| db.url.as_str())
                .ok_or_else(|| {
                    StoreError::Unavailable("database.url is not configured".to_string())
                })?;
            let db = DbClient::new(url).await.map_err(database::store_error)?;
            db.migrate()
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(Arc::new(PgDocumentStore::new(&db)))
        }
    }
}

/// Catalog Store over the configured source.
pub fn catalog_store(config: &Config, store: Arc<dyn DocumentStore>) -> CatalogStore {
    match config.catalog.source {
        CatalogSourceKind::Static => CatalogStore::static_seed(),
        CatalogSourceKind::Collection => {
            let collection = CollectionPath::new(config.catalog.collection.as_str());
            CatalogStore::from_collection(store, collection)
        }
    }
}

/// Media uploader over the configured storage root, in memory when unset.
pub fn uploader(config: &Config) -> Result<ObjectStoreUploader, object_store::Error> {
    let storage = &config.storage;
    match &storage.root {
        Some(root) => ObjectStoreUploader::local(
            root,
            storage.public_base_url.as_str(),
            storage.chunk_size_bytes,
        ),
        None => Ok(ObjectStoreUploader::in_memory(
            storage.public_base_url.as_str(),
            storage.chunk_size_bytes,
        )),
    }
}
