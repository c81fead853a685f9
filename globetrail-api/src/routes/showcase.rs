use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use globetrail_core::{CoreError, DocumentStream};
use globetrail_view::admin::newest_first;
use globetrail_view::{AdminItem, AdminTab};
use std::convert::Infallible;
use tracing::warn;

use crate::{error::AppError, state::AppState};

/// Public read side of the admin-managed `destinations` and `packages`
/// collections, most recently edited first.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/showcase/{tab}", get(list_items))
        .route("/v1/showcase/{tab}/stream", get(stream_items))
}

pub(crate) fn parse_tab(tab: &str) -> Result<AdminTab, AppError> {
    tab.parse::<AdminTab>()
        .map_err(|e| AppError::NotFoundError(e.to_string()))
}

pub(crate) async fn read_items(
    state: &AppState,
    tab: AdminTab,
) -> Result<Vec<AdminItem>, AppError> {
    let collection = tab.collection(&state.app_id);
    let documents = state
        .store
        .read_all(&collection)
        .await
        .map_err(|e| AppError::core(CoreError::fetch(&collection, e)))?;
    Ok(newest_first(&documents))
}

/// One SSE event per collection snapshot, named after the tab.
pub(crate) async fn item_events(
    state: &AppState,
    tab: AdminTab,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let collection = tab.collection(&state.app_id);
    let documents: DocumentStream = state
        .store
        .subscribe(&collection)
        .await
        .map_err(|e| AppError::core(CoreError::fetch(&collection, e)))?;

    let stream = documents.filter_map(move |snapshot| async move {
        match Event::default().event(tab.as_str()).json_data(newest_first(&snapshot)) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!("Dropping unserializable {} snapshot: {}", tab, e);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn list_items(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<Json<Vec<AdminItem>>, AppError> {
    let tab = parse_tab(&tab)?;
    read_items(&state, tab).await.map(Json)
}

async fn stream_items(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let tab = parse_tab(&tab)?;
    item_events(&state, tab).await
}
