pub mod document;
pub mod identity;
pub mod upload;

pub use document::{CollectionPath, Document, DocumentStore, DocumentStream, Fields, StoreError};
pub use identity::{AuthError, AuthProvider, AuthSession, Identity};
pub use upload::{ObjectUploader, UploadError, UploadEvent, UploadHandle};

/// Failure classes surfaced to the views. None of them is fatal.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Bad form input. Shown inline, never propagated further.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Collection read failed. Callers substitute an empty result.
    #[error("Failed to fetch {collection}: {source}")]
    Fetch {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// Write failed. Shown as a blocking alert, not retried.
    #[error("Failed to save changes: {0}")]
    Persistence(#[source] StoreError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
}

impl CoreError {
    pub fn fetch(collection: &CollectionPath, source: StoreError) -> Self {
        CoreError::Fetch {
            collection: collection.to_string(),
            source,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
