use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub type Fields = Map<String, Value>;

/// Snapshots pushed to a subscriber: the full collection after each change.
pub type DocumentStream = BoxStream<'static, Vec<Document>>;

/// A stored record: its identifier plus whatever fields were written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self { id: id.into(), data }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Stored fields merged with the identifier under `id`.
    pub fn into_value(self) -> Value {
        let mut data = self.data;
        data.insert("id".to_string(), Value::String(self.id));
        Value::Object(data)
    }
}

/// Slash-separated collection path, e.g. `packages` or
/// `artifacts/{app_id}/public/data/destinations`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn new(path: impl Into<String>) -> Self {
        let path: String = path.into();
        Self(path.trim_matches('/').to_string())
    }

    /// Tenant-scoped collection used by the admin console.
    pub fn tenant(app_id: &str, collection: &str) -> Self {
        Self::new(format!("artifacts/{}/public/data/{}", app_id, collection))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Document store error: {0}")]
    Backend(String),

    #[error("Malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Hosted document database capability.
///
/// Implementations are shared behind `Arc<dyn DocumentStore>` and passed to
/// whatever needs them; nothing reads a process-wide handle.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of a collection, in insertion order.
    async fn read_all(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError>;

    async fn read_one(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Documents whose `field` equals `value`.
    async fn read_where(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let documents = self.read_all(collection).await?;
        Ok(documents
            .into_iter()
            .filter(|doc| doc.get(field) == Some(value))
            .collect())
    }

    /// Stores a new document under a generated id and returns the id.
    async fn create(&self, collection: &CollectionPath, data: Fields) -> Result<String, StoreError>;

    /// Creates or replaces the document with the given id.
    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Fields,
    ) -> Result<(), StoreError>;

    /// Merges `partial` into an existing document.
    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        partial: Fields,
    ) -> Result<(), StoreError>;

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError>;

    /// Pushes the current collection immediately, then again after every
    /// change. Dropping the stream unsubscribes.
    async fn subscribe(&self, collection: &CollectionPath) -> Result<DocumentStream, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tenant_path() {
        let path = CollectionPath::tenant("default-app-id", "packages");
        assert_eq!(path.as_str(), "artifacts/default-app-id/public/data/packages");
        assert_eq!(CollectionPath::new("/bookings/").as_str(), "bookings");
    }

    #[test]
    fn test_document_into_value_merges_id() {
        let data = json!({"title": "Paris", "price": 95000}).as_object().cloned().unwrap();
        let value = Document::new("1", data).into_value();
        assert_eq!(value["id"], "1");
        assert_eq!(value["title"], "Paris");
    }
}
