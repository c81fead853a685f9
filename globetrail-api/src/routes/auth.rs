use axum::{
    extract::State,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use globetrail_core::Identity;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::AppError,
    middleware::{session_auth_middleware, CustomerClaims},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub role: String,
    pub user: Identity,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let profile = Router::new()
        .route("/v1/auth/me", get(current_user))
        .route("/v1/auth/profile", put(update_profile))
        .route_layer(middleware::from_fn_with_state(state, session_auth_middleware));

    Router::new()
        .route("/v1/auth/signup", post(sign_up))
        .route("/v1/auth/signin", post(sign_in))
        .route("/v1/auth/guest", post(login_guest))
        .merge(profile)
}

fn issue(state: &AppState, identity: Identity) -> Result<Json<AuthResponse>, AppError> {
    let claims = CustomerClaims::for_identity(&identity, &state.auth);
    let token = claims
        .encode(&state.auth)
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        role: claims.role,
        user: identity,
    }))
}

async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let identity = state
        .auth_provider
        .sign_up(&req.email, &req.password)
        .await
        .map_err(AppError::auth)?;
    issue(&state, identity)
}

async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let identity = state
        .auth_provider
        .sign_in(&req.email, &req.password)
        .await
        .map_err(AppError::auth)?;
    issue(&state, identity)
}

async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let identity = state
        .auth_provider
        .sign_in_anonymously()
        .await
        .map_err(AppError::auth)?;
    info!("Guest session {}", identity.uid);
    issue(&state, identity)
}

/// Renames the caller and re-issues their token with the new name.
async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let identity = state
        .auth_provider
        .update_display_name(&claims.sub, &req.display_name)
        .await
        .map_err(AppError::auth)?;
    issue(&state, identity)
}

/// The caller's identity as the auth provider knows it now.
async fn current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<Identity>, AppError> {
    state
        .auth_provider
        .lookup(&claims.sub)
        .await
        .map_err(AppError::auth)?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("No account for {}", claims.sub)))
}
