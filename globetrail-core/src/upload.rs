use bytes::Bytes;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// Percentage of bytes transferred, 0.0..=100.0.
    Progress(f64),
    /// Public URL of the stored object.
    Complete(String),
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Upload failed: {0}")]
    Failed(String),

    #[error("Upload interrupted before completion")]
    Interrupted,
}

/// Receiving end of a running upload.
pub struct UploadHandle {
    events: mpsc::Receiver<UploadEvent>,
}

impl UploadHandle {
    pub fn new(events: mpsc::Receiver<UploadEvent>) -> Self {
        Self { events }
    }

    /// An upload that has already failed.
    pub fn failed(reason: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.try_send(UploadEvent::Failed(reason.into()));
        Self::new(rx)
    }

    /// Waits for the final URL, reporting each progress update on the way.
    pub async fn finish(mut self, mut on_progress: impl FnMut(f64)) -> Result<String, UploadError> {
        while let Some(event) = self.events.recv().await {
            match event {
                UploadEvent::Progress(percent) => on_progress(percent),
                UploadEvent::Complete(url) => return Ok(url),
                UploadEvent::Failed(reason) => return Err(UploadError::Failed(reason)),
            }
        }
        Err(UploadError::Interrupted)
    }
}

/// Object storage capability.
pub trait ObjectUploader: Send + Sync {
    /// Starts uploading `bytes` to `path`. Progress and the outcome arrive on
    /// the returned handle.
    fn upload(&self, path: &str, bytes: Bytes) -> UploadHandle;
}
