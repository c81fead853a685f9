use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get},
    Extension, Json, Router,
};
use chrono::Utc;
use globetrail_order::{compose, Booking, BookingRecord};
use globetrail_shared::BookingCancelledEvent;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::AppError,
    middleware::{session_auth_middleware, CustomerClaims},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub package_id: String,
    /// Missing or blank dates are rejected by the composer, not the extractor.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub guests: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub booking: Booking,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings).post(create_booking))
        .route("/v1/bookings/{id}", delete(cancel_booking))
        .route_layer(middleware::from_fn_with_state(state, session_auth_middleware))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let pkg = state
        .catalog
        .find(&req.package_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Package {} not found", req.package_id)))?;

    let identity = claims.identity();
    // an absent count is out of range and fails guest validation
    let guests = req.guests.unwrap_or(0);
    let booking = compose(&pkg, &req.date, guests, Some(&identity), Utc::now())
        .map_err(AppError::booking)?;

    let id = state.bookings.create(&booking).await.map_err(AppError::core)?;
    // no subscribers is fine
    let _ = state.booking_tx.send(booking.created_event(&id));

    Ok((StatusCode::CREATED, Json(BookingResponse { id, booking })))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<BookingRecord>>, AppError> {
    let history = state
        .bookings
        .list_for_user(&claims.sub)
        .await
        .map_err(AppError::core)?;
    Ok(Json(history.records().to_vec()))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let record = state
        .bookings
        .get(&id)
        .await
        .map_err(AppError::core)?
        .ok_or_else(|| AppError::NotFoundError(format!("Booking {} not found", id)))?;

    if record.booking.user_id != claims.sub {
        return Err(AppError::AuthorizationError(
            "Booking does not belong to you".to_string(),
        ));
    }

    state.bookings.delete(&id).await.map_err(AppError::core)?;
    let event = BookingCancelledEvent {
        booking_id: id,
        user_id: claims.sub,
        timestamp: Utc::now().timestamp(),
    };
    info!("Booking cancelled: {:?}", event);
    Ok(StatusCode::NO_CONTENT)
}
