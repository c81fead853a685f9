use bytes::Bytes;
use globetrail_core::{ObjectUploader, UploadEvent, UploadHandle};
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Uploads media to an `object_store` backend, in parts once the payload is
/// larger than one chunk, and reports progress after every part.
#[derive(Clone)]
pub struct ObjectStoreUploader {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
    chunk_size: usize,
}

impl ObjectStoreUploader {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        public_base_url: impl Into<String>,
        chunk_size: usize,
    ) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn in_memory(public_base_url: impl Into<String>, chunk_size: usize) -> Self {
        Self::new(Arc::new(InMemory::new()), public_base_url, chunk_size)
    }

    pub fn local(
        root: &std::path::Path,
        public_base_url: impl Into<String>,
        chunk_size: usize,
    ) -> Result<Self, object_store::Error> {
        std::fs::create_dir_all(root).map_err(|e| object_store::Error::Generic {
            store: "LocalFileSystem",
            source: Box::new(e),
        })?;
        let store = LocalFileSystem::new_with_prefix(root)?;
        Ok(Self::new(Arc::new(store), public_base_url, chunk_size))
    }

    pub fn url_for(&self, path: &Path) -> String {
        format!("{}/{}", self.public_base_url, path)
    }

    /// Reads back a stored object; `None` when nothing is stored at `path`.
    pub async fn fetch(&self, path: &str) -> Result<Option<Bytes>, object_store::Error> {
        let location = Path::parse(path)?;
        match self.store.get(&location).await {
            Ok(result) => result.bytes().await.map(Some),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl ObjectUploader for ObjectStoreUploader {
    fn upload(&self, path: &str, bytes: Bytes) -> UploadHandle {
        let location = match Path::parse(path) {
            Ok(location) => location,
            Err(e) => return UploadHandle::failed(format!("invalid upload path '{}': {}", path, e)),
        };

        let (tx, rx) = mpsc::channel(16);
        let uploader = self.clone();

        tokio::spawn(async move {
            let outcome = uploader.transfer(&location, bytes, &tx).await;
            let event = match outcome {
                Ok(()) => {
                    let url = uploader.url_for(&location);
                    debug!("Uploaded {}", url);
                    UploadEvent::Complete(url)
                }
                Err(e) => {
                    warn!("Upload of {} failed: {}", location, e);
                    UploadEvent::Failed(e.to_string())
                }
            };
            let _ = tx.send(event).await;
        });

        UploadHandle::new(rx)
    }
}

impl ObjectStoreUploader {
    async fn transfer(
        &self,
        location: &Path,
        bytes: Bytes,
        progress: &mpsc::Sender<UploadEvent>,
    ) -> Result<(), object_store::Error> {
        let total = bytes.len();

        if total <= self.chunk_size {
            self.store.put(location, PutPayload::from(bytes)).await?;
            let _ = progress.send(UploadEvent::Progress(100.0)).await;
            return Ok(());
        }

        let mut upload = self.store.put_multipart(location).await?;
        let mut sent = 0usize;
        for chunk in bytes.chunks(self.chunk_size) {
            if let Err(e) = upload.put_part(PutPayload::from(bytes.slice_ref(chunk))).await {
                let _ = upload.abort().await;
                return Err(e);
            }
            sent += chunk.len();
            let percent = sent as f64 / total as f64 * 100.0;
            let _ = progress.send(UploadEvent::Progress(percent)).await;
        }

        if let Err(e) = upload.complete().await {
            let _ = upload.abort().await;
            return Err(e);
        }
        Ok(())
    }
}
