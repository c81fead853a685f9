use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use globetrail_core::{
    AuthSession, CollectionPath, CoreError, Document, DocumentStore, Fields, ObjectUploader,
};
use globetrail_store::catalog_repo::{coerce_number, coerce_timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{update_if_alive, Shared, ViewError};

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminTab {
    #[default]
    Destinations,
    Packages,
}

impl AdminTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminTab::Destinations => "destinations",
            AdminTab::Packages => "packages",
        }
    }

    pub fn collection(&self, app_id: &str) -> CollectionPath {
        CollectionPath::tenant(app_id, self.as_str())
    }
}

impl fmt::Display for AdminTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown admin tab '{0}'")]
pub struct UnknownTab(pub String);

impl FromStr for AdminTab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "destinations" => Ok(AdminTab::Destinations),
            "packages" => Ok(AdminTab::Packages),
            other => Err(UnknownTab(other.to_string())),
        }
    }
}

/// One row of the admin list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub author_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AdminItem {
    pub fn from_document(doc: &Document) -> Self {
        let text = |field: &str| doc.get(field).and_then(Value::as_str).map(str::to_string);
        Self {
            id: doc.id.clone(),
            name: text("name").or_else(|| text("title")).unwrap_or_default(),
            description: text("description").unwrap_or_default(),
            image: text("image").or_else(|| text("imageUrl")),
            price: doc.get("price").and_then(coerce_number),
            author_id: text("authorId"),
            created_at: doc.get("createdAt").and_then(coerce_timestamp),
            updated_at: doc.get("updatedAt").and_then(coerce_timestamp),
        }
    }
}

/// Most recently edited first; never-edited rows last.
pub fn newest_first(documents: &[Document]) -> Vec<AdminItem> {
    let mut items: Vec<AdminItem> = documents.iter().map(AdminItem::from_document).collect();
    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    items
}

/// A picked image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// The edit form as submitted.
#[derive(Debug, Clone, Default)]
pub struct AdminForm {
    pub name: String,
    pub description: String,
    /// Price text; only read on the packages tab.
    pub price: String,
    /// Image URL already stored on the record being edited.
    pub image: Option<String>,
    pub new_image: Option<ImageUpload>,
}

/// Document body written for a save. Packages carry a price parsed from
/// the form text, 0 when it is not a number.
pub fn admin_payload(
    tab: AdminTab,
    form: &AdminForm,
    image: Option<&str>,
    author_id: &str,
    now: DateTime<Utc>,
) -> Fields {
    let mut fields = Fields::new();
    fields.insert("name".to_string(), Value::from(form.name.trim()));
    fields.insert("description".to_string(), Value::from(form.description.trim()));
    fields.insert("image".to_string(), image.map(Value::from).unwrap_or(Value::Null));
    fields.insert("updatedAt".to_string(), Value::from(now.to_rfc3339()));
    fields.insert("authorId".to_string(), Value::from(author_id));
    if tab == AdminTab::Packages {
        let price = form.price.trim().parse::<f64>().ok().filter(|p| p.is_finite()).unwrap_or(0.0);
        fields.insert("price".to_string(), Value::from(price));
    }
    fields
}

/// Object path for an uploaded image: `{tab}/{millis}_{file}`.
pub fn upload_path(tab: AdminTab, file_name: &str, now: DateTime<Utc>) -> String {
    let file: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}/{}_{}", tab, now.timestamp_millis(), file)
}

// ============================================================================
// Controller
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AdminState {
    pub tab: AdminTab,
    pub items: Vec<AdminItem>,
    pub loading: bool,
    pub saving: bool,
    /// Percent of the current image upload, while one runs.
    pub upload_progress: Option<f64>,
    pub error: Option<String>,
}

/// Content management console for destinations and packages.
pub struct AdminController {
    store: Arc<dyn DocumentStore>,
    uploader: Arc<dyn ObjectUploader>,
    session: Arc<AuthSession>,
    app_id: String,
    admin_emails: Vec<String>,
    state: Shared<AdminState>,
    subscription: Option<JoinHandle<()>>,
}

impl AdminController {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        uploader: Arc<dyn ObjectUploader>,
        session: Arc<AuthSession>,
        app_id: impl Into<String>,
        admin_emails: Vec<String>,
    ) -> Self {
        let (state, _) = watch::channel(AdminState::default());
        Self {
            store,
            uploader,
            session,
            app_id: app_id.into(),
            admin_emails,
            state: Arc::new(state),
            subscription: None,
        }
    }

    pub fn state(&self) -> AdminState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AdminState> {
        self.state.subscribe()
    }

    fn author_id(&self) -> Result<String, ViewError> {
        let identity = self.session.current_identity().ok_or(ViewError::NeedsAuthentication)?;
        let is_admin = identity
            .email
            .as_deref()
            .is_some_and(|email| self.admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email)));
        if is_admin {
            Ok(identity.uid)
        } else {
            Err(ViewError::Forbidden)
        }
    }

    fn collection(&self) -> CollectionPath {
        self.state.borrow().tab.collection(&self.app_id)
    }

    /// Switches tab and follows that collection live. The previous
    /// subscription is cancelled.
    pub async fn select_tab(&mut self, tab: AdminTab) -> Result<(), ViewError> {
        self.author_id()?;
        if let Some(previous) = self.subscription.take() {
            previous.abort();
        }
        self.state.send_modify(|s| {
            *s = AdminState {
                tab,
                loading: true,
                ..AdminState::default()
            };
        });

        let collection = tab.collection(&self.app_id);
        let mut stream = match self.store.subscribe(&collection).await {
            Ok(stream) => stream,
            Err(e) => {
                let err = CoreError::fetch(&collection, e);
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(err.to_string());
                });
                return Err(err.into());
            }
        };

        let state = Arc::downgrade(&self.state);
        self.subscription = Some(tokio::spawn(async move {
            while let Some(documents) = stream.next().await {
                let items = newest_first(&documents);
                let alive = update_if_alive(&state, |s| {
                    if s.tab == tab {
                        s.items = items;
                        s.loading = false;
                    }
                });
                if !alive {
                    break;
                }
            }
        }));
        Ok(())
    }

    /// Uploads the new image if there is one, then creates or updates the
    /// record. Returns the record id.
    pub async fn save(
        &self,
        form: AdminForm,
        editing: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, ViewError> {
        let author_id = self.author_id()?;
        let tab = self.state.borrow().tab;
        let collection = self.collection();
        self.state.send_modify(|s| {
            s.saving = true;
            s.error = None;
        });

        let result = self.persist(tab, &collection, &form, editing, &author_id, now).await;
        self.state.send_modify(|s| {
            s.saving = false;
            s.upload_progress = None;
            if let Err(e) = &result {
                s.error = Some(e.to_string());
            }
        });
        result
    }

    async fn persist(
        &self,
        tab: AdminTab,
        collection: &CollectionPath,
        form: &AdminForm,
        editing: Option<&str>,
        author_id: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ViewError> {
        let image = match &form.new_image {
            Some(upload) => {
                let path = upload_path(tab, &upload.file_name, now);
                let state = self.state.clone();
                let url = self
                    .uploader
                    .upload(&path, upload.bytes.clone())
                    .finish(|percent| state.send_modify(|s| s.upload_progress = Some(percent)))
                    .await?;
                Some(url)
            }
            None => form.image.clone(),
        };

        let mut fields = admin_payload(tab, form, image.as_deref(), author_id, now);
        match editing {
            Some(id) => {
                self.store
                    .update(collection, id, fields)
                    .await
                    .map_err(CoreError::Persistence)?;
                info!("Updated {}/{}", collection, id);
                Ok(id.to_string())
            }
            None => {
                fields.insert("createdAt".to_string(), Value::from(now.to_rfc3339()));
                let id = self
                    .store
                    .create(collection, fields)
                    .await
                    .map_err(CoreError::Persistence)?;
                info!("Created {}/{}", collection, id);
                Ok(id)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ViewError> {
        self.author_id()?;
        let collection = self.collection();
        if let Err(e) = self.store.delete(&collection, id).await {
            warn!("Deleting {}/{} failed: {}", collection, id, e);
            let err = CoreError::Persistence(e);
            self.state.send_modify(|s| s.error = Some(err.to_string()));
            return Err(err.into());
        }
        Ok(())
    }
}

impl Drop for AdminController {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }
    }
}
