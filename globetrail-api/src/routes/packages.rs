use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use globetrail_catalog::{
    parse_guests, Experience, FeaturedCategory, Mood, Package, Quote, SortMode,
};
use globetrail_view::ListingQuery;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Listing query string. `experience` and `mood` take comma-separated tags.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub experience: Option<String>,
    pub mood: Option<String>,
    pub sort: Option<String>,
    pub q: Option<String>,
    pub category: Option<String>,
}

impl ListingParams {
    fn into_query(self) -> Result<ListingQuery, AppError> {
        let mut query = ListingQuery::default();
        for tag in tags(self.experience.as_deref()) {
            query.selection.experience.insert(Experience::from(tag));
        }
        for tag in tags(self.mood.as_deref()) {
            query.selection.mood.insert(Mood::from(tag));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            query.sort = sort
                .parse::<SortMode>()
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
        }
        query.search = self.q.unwrap_or_default();
        query.category = FeaturedCategory::parse(self.category.as_deref().unwrap_or_default());
        Ok(query)
    }
}

fn tags(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// A package as served, with the image already resolved to the default
/// picture when the record has none.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageView {
    #[serde(flatten)]
    pub package: Package,
    pub image_url: String,
}

impl From<Package> for PackageView {
    fn from(package: Package) -> Self {
        Self {
            image_url: package.image_or_fallback().to_string(),
            package,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub packages: Vec<PackageView>,
    pub count: usize,
    /// Set when the catalog could not be read; `packages` is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    pub guests: String,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/packages", get(list_packages))
        .route("/v1/packages/{id}", get(get_package))
        .route("/v1/packages/{id}/quote", get(quote))
}

async fn list_packages(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ListingResponse>, AppError> {
    let query = params.into_query()?;

    let mut catalog = state.catalog.snapshot();
    if catalog.is_empty() {
        // first request after a failed or skipped load
        catalog = state.catalog.refresh().await;
    }

    let packages: Vec<PackageView> = query
        .apply(&catalog)
        .into_iter()
        .map(PackageView::from)
        .collect();
    Ok(Json(ListingResponse {
        count: packages.len(),
        packages,
        error: state.catalog.last_error(),
    }))
}

fn find(state: &AppState, id: &str) -> Result<Package, AppError> {
    state
        .catalog
        .find(id)
        .ok_or_else(|| AppError::NotFoundError(format!("Package {} not found", id)))
}

async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PackageView>, AppError> {
    find(&state, &id).map(|pkg| Json(pkg.into()))
}

async fn quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<Quote>, AppError> {
    let pkg = find(&state, &id)?;
    let guests =
        parse_guests(&params.guests).map_err(|e| AppError::ValidationError(e.to_string()))?;
    Ok(Json(Quote::new(pkg.price, guests)))
}
