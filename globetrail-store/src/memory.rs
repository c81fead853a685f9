use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use globetrail_core::{CollectionPath, Document, DocumentStore, DocumentStream, Fields, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

/// Process-local document store. Collections keep insertion order and
/// every write is announced to subscribers of that collection.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<Inner>,
}

struct Inner {
    collections: RwLock<HashMap<CollectionPath, Vec<Document>>>,
    changes: broadcast::Sender<CollectionPath>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(HashMap::new()),
                changes,
            }),
        }
    }

    async fn snapshot(&self, collection: &CollectionPath) -> Vec<Document> {
        self.inner
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn notify(&self, collection: &CollectionPath) {
        // no receivers is fine
        let _ = self.inner.changes.send(collection.clone());
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read_all(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        Ok(self.snapshot(collection).await)
    }

    async fn read_one(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.inner.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn create(
        &self,
        collection: &CollectionPath,
        data: Fields,
    ) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        {
            let mut collections = self.inner.collections.write().await;
            collections
                .entry(collection.clone())
                .or_default()
                .push(Document::new(id.clone(), data));
        }
        debug!("Created {}/{}", collection, id);
        self.notify(collection);
        Ok(id)
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Fields,
    ) -> Result<(), StoreError> {
        {
            let mut collections = self.inner.collections.write().await;
            let docs = collections.entry(collection.clone()).or_default();
            match docs.iter_mut().find(|d| d.id == id) {
                Some(existing) => existing.data = data,
                None => docs.push(Document::new(id, data)),
            }
        }
        self.notify(collection);
        Ok(())
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        partial: Fields,
    ) -> Result<(), StoreError> {
        {
            let mut collections = self.inner.collections.write().await;
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;
            doc.data.extend(partial);
        }
        self.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        let removed = {
            let mut collections = self.inner.collections.write().await;
            match collections.get_mut(collection) {
                Some(docs) => {
                    let before = docs.len();
                    docs.retain(|d| d.id != id);
                    docs.len() != before
                }
                None => false,
            }
        };
        if removed {
            self.notify(collection);
        }
        Ok(())
    }

    async fn subscribe(&self, collection: &CollectionPath) -> Result<DocumentStream, StoreError> {
        let receiver = self.inner.changes.subscribe();
        let initial = self.snapshot(collection).await;

        let store = self.clone();
        let target = collection.clone();
        let updates = BroadcastStream::new(receiver).filter_map(move |changed| {
            let store = store.clone();
            let target = target.clone();
            async move {
                match changed {
                    Ok(path) if path == target => Some(store.snapshot(&target).await),
                    Ok(_) => None,
                    // lagged: re-read so the subscriber catches up
                    Err(_) => Some(store.snapshot(&target).await),
                }
            }
        });

        Ok(stream::once(async move { initial }).chain(updates).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_read_update_delete() {
        let store = MemoryDocumentStore::new();
        let bookings = CollectionPath::new("bookings");

        let id = store.create(&bookings, fields(json!({"guests": 2}))).await.unwrap();
        assert_eq!(store.read_all(&bookings).await.unwrap().len(), 1);

        let partial = fields(json!({"guests": 3, "status": "Confirmed"}));
        store.update(&bookings, &id, partial).await.unwrap();
        let doc = store.read_one(&bookings, &id).await.unwrap().unwrap();
        assert_eq!(doc.get("guests"), Some(&json!(3)));
        assert_eq!(doc.get("status"), Some(&json!("Confirmed")));

        store.delete(&bookings, &id).await.unwrap();
        assert!(store.read_one(&bookings, &id).await.unwrap().is_none());
        // deleting again is not an error
        store.delete(&bookings, &id).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = MemoryDocumentStore::new();
        let err = store
            .update(&CollectionPath::new("packages"), "nope", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_replaces_and_keeps_position() {
        let store = MemoryDocumentStore::new();
        let packages = CollectionPath::new("packages");
        store.set(&packages, "1", fields(json!({"title": "Paris"}))).await.unwrap();
        store.set(&packages, "2", fields(json!({"title": "Tokyo"}))).await.unwrap();
        store.set(&packages, "1", fields(json!({"title": "Paris Deluxe"}))).await.unwrap();

        let docs = store.read_all(&packages).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "1");
        assert_eq!(docs[0].get("title"), Some(&json!("Paris Deluxe")));
    }

    #[tokio::test]
    async fn test_read_where_matches_field() {
        let store = MemoryDocumentStore::new();
        let bookings = CollectionPath::new("bookings");
        store.create(&bookings, fields(json!({"userId": "u-1"}))).await.unwrap();
        store.create(&bookings, fields(json!({"userId": "u-2"}))).await.unwrap();
        store.create(&bookings, fields(json!({"userId": "u-1"}))).await.unwrap();

        let mine = store.read_where(&bookings, "userId", &json!("u-1")).await.unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[tokio::test]
    async fn test_subscribe_pushes_snapshots() {
        let store = MemoryDocumentStore::new();
        let packages = CollectionPath::new("packages");
        let others = CollectionPath::new("bookings");
        store.set(&packages, "1", fields(json!({"title": "Paris"}))).await.unwrap();

        let mut stream = store.subscribe(&packages).await.unwrap();
        assert_eq!(stream.next().await.unwrap().len(), 1);

        store.create(&others, Fields::new()).await.unwrap();
        store.set(&packages, "2", fields(json!({"title": "Tokyo"}))).await.unwrap();
        // the bookings write is not delivered to a packages subscriber
        assert_eq!(stream.next().await.unwrap().len(), 2);

        store.delete(&packages, "1").await.unwrap();
        let latest = stream.next().await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, "2");
    }
}
