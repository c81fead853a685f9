use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::sse::{Event, Sse},
    routing::{get, post, put},
    Extension, Json, Router,
};
use bytes::Bytes;
use chrono::Utc;
use futures_util::Stream;
use globetrail_core::{CollectionPath, CoreError, ObjectUploader};
use globetrail_store::{seed_all, SeedReport};
use globetrail_view::admin::{admin_payload, upload_path};
use globetrail_view::{AdminForm, AdminItem, AdminTab};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use tracing::{debug, info};

use crate::{
    error::AppError,
    middleware::{admin_auth_middleware, CustomerClaims},
    routes::showcase::{item_events, parse_tab, read_items},
    state::AppState,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Number or text; non-numeric text is stored as 0.
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
}

impl AdminRequest {
    fn into_form(self) -> AdminForm {
        let price = match self.price {
            Some(Value::String(text)) => text,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        AdminForm {
            name: self.name,
            description: self.description,
            price,
            image: self.image.filter(|url| !url.is_empty()),
            new_image: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/seed", post(seed))
        .route("/v1/admin/uploads/{tab}/{file}", put(upload_image))
        .route("/v1/admin/{tab}", get(list_items).post(create_item))
        .route("/v1/admin/{tab}/stream", get(stream_items))
        .route("/v1/admin/{tab}/{id}", put(update_item).delete(delete_item))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

fn collection(state: &AppState, tab: AdminTab) -> CollectionPath {
    tab.collection(&state.app_id)
}

async fn list_items(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<Json<Vec<AdminItem>>, AppError> {
    let tab = parse_tab(&tab)?;
    read_items(&state, tab).await.map(Json)
}

async fn create_item(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(tab): Path<String>,
    Json(req): Json<AdminRequest>,
) -> Result<(StatusCode, Json<SavedResponse>), AppError> {
    let tab = parse_tab(&tab)?;
    let form = req.into_form();
    let now = Utc::now();

    let mut fields = admin_payload(tab, &form, form.image.as_deref(), &claims.sub, now);
    fields.insert("createdAt".to_string(), Value::from(now.to_rfc3339()));

    let collection = collection(&state, tab);
    let id = state
        .store
        .create(&collection, fields)
        .await
        .map_err(|e| AppError::core(CoreError::Persistence(e)))?;
    info!("Admin {} created {}/{}", claims.sub, collection, id);

    Ok((StatusCode::CREATED, Json(SavedResponse { id })))
}

async fn update_item(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path((tab, id)): Path<(String, String)>,
    Json(req): Json<AdminRequest>,
) -> Result<Json<SavedResponse>, AppError> {
    let tab = parse_tab(&tab)?;
    let form = req.into_form();
    let fields = admin_payload(tab, &form, form.image.as_deref(), &claims.sub, Utc::now());

    let collection = collection(&state, tab);
    state
        .store
        .update(&collection, &id, fields)
        .await
        .map_err(AppError::store)?;
    info!("Admin {} updated {}/{}", claims.sub, collection, id);

    Ok(Json(SavedResponse { id }))
}

async fn delete_item(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path((tab, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let tab = parse_tab(&tab)?;
    let collection = collection(&state, tab);
    state
        .store
        .delete(&collection, &id)
        .await
        .map_err(|e| AppError::core(CoreError::Persistence(e)))?;
    info!("Admin {} deleted {}/{}", claims.sub, collection, id);

    Ok(StatusCode::NO_CONTENT)
}

async fn upload_image(
    State(state): State<AppState>,
    Path((tab, file)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let tab = parse_tab(&tab)?;
    if body.is_empty() {
        return Err(AppError::ValidationError("Empty upload".to_string()));
    }

    let path = upload_path(tab, &file, Utc::now());
    let url = state
        .uploader
        .upload(&path, body)
        .finish(|percent| debug!("Upload {}: {:.0}%", path, percent))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(UploadResponse { url }))
}

async fn stream_items(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let tab = parse_tab(&tab)?;
    item_events(&state, tab).await
}

async fn seed(State(state): State<AppState>) -> Result<Json<SeedReport>, AppError> {
    let packages = state
        .catalog
        .collection()
        .cloned()
        .unwrap_or_else(|| CollectionPath::new("packages"));

    let report = seed_all(&state.store, &packages).await.map_err(AppError::store)?;
    state.catalog.refresh().await;
    Ok(Json(report))
}
