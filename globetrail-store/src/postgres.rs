use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use globetrail_core::{CollectionPath, Document, DocumentStore, DocumentStream, Fields, StoreError};
use serde_json::Value;
use sqlx::postgres::PgListener;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};

use crate::database::{store_error, DbClient};

const CHANGES_CHANNEL: &str = "document_changes";

/// `DocumentStore` over the `documents` table. Each collection is a set of
/// rows sharing a `collection` key; writes announce themselves with
/// `pg_notify` so subscribers in any process can re-read.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub fn new(db: &DbClient) -> Self {
        Self { pool: db.pool.clone() }
    }

    /// Announces a committed write. The row is already stored, so a lost
    /// notification only delays subscribers and is not reported as a failure.
    async fn notify(&self, collection: &CollectionPath) -> bool {
        let sent = sqlx::query("SELECT pg_notify($1, $2)")
            .bind(CHANGES_CHANNEL)
            .bind(collection.as_str())
            .execute(&self.pool)
            .await;
        match sent {
            Ok(_) => true,
            Err(e) => {
                warn!("Change notification for {} not sent: {}", collection, e);
                false
            }
        }
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    let id: String = row.try_get("id").map_err(store_error)?;
    let Json(data): Json<Value> = row.try_get("data").map_err(store_error)?;
    let data = match data {
        Value::Object(fields) => fields,
        _ => Fields::new(),
    };
    Ok(Document::new(id, data))
}

async fn read_collection(
    pool: &Pool<Postgres>,
    collection: &CollectionPath,
) -> Result<Vec<Document>, StoreError> {
    let rows = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 ORDER BY seq")
        .bind(collection.as_str())
        .fetch_all(pool)
        .await
        .map_err(store_error)?;

    rows.iter().map(row_to_document).collect()
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn read_all(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        read_collection(&self.pool, collection).await
    }

    async fn read_one(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn read_where(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, data FROM documents WHERE collection = $1 AND data -> $2 = $3 ORDER BY seq",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter().map(row_to_document).collect()
    }

    async fn create(
        &self,
        collection: &CollectionPath,
        data: Fields,
    ) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection.as_str())
            .bind(&id)
            .bind(Json(Value::Object(data)))
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        self.notify(collection).await;
        Ok(id)
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Fields,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(Value::Object(data)))
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        self.notify(collection).await;
        Ok(())
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        partial: Fields,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = NOW() WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(Value::Object(partial)))
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        self.notify(collection).await;
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() > 0 {
            self.notify(collection).await;
        }
        Ok(())
    }

    async fn subscribe(&self, collection: &CollectionPath) -> Result<DocumentStream, StoreError> {
        let mut listener = PgListener::connect_with(&self.pool).await.map_err(store_error)?;
        listener.listen(CHANGES_CHANNEL).await.map_err(store_error)?;

        let initial = read_collection(&self.pool, collection).await?;
        let (tx, rx) = mpsc::channel(16);
        let pool = self.pool.clone();
        let target = collection.clone();

        tokio::spawn(async move {
            loop {
                let notification = match listener.recv().await {
                    Ok(n) => n,
                    Err(e) => {
                        error!("Change listener for {} stopped: {}", target, e);
                        break;
                    }
                };
                if notification.payload() != target.as_str() {
                    continue;
                }
                match read_collection(&pool, &target).await {
                    Ok(docs) => {
                        if tx.send(docs).await.is_err() {
                            // subscriber dropped the stream
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to re-read {} after change: {}", target, e),
                }
            }
        });

        Ok(stream::once(async move { initial })
            .chain(ReceiverStream::new(rx))
            .boxed())
    }
}
