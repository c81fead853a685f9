use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use globetrail_core::{AuthError, CoreError, StoreError};
use globetrail_order::BookingError;
use globetrail_view::ViewError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn auth(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail | AuthError::WeakPassword => {
                AppError::ValidationError(err.to_string())
            }
            AuthError::EmailInUse => AppError::ConflictError(err.to_string()),
            AuthError::InvalidCredentials | AuthError::NotSignedIn => {
                AppError::AuthenticationError(err.to_string())
            }
            AuthError::Backend(msg) => AppError::InternalServerError(msg),
        }
    }

    pub fn store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFoundError(err.to_string()),
            other => AppError::InternalServerError(other.to_string()),
        }
    }

    pub fn core(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => AppError::ValidationError(msg),
            CoreError::Auth(e) => AppError::auth(e),
            CoreError::Persistence(StoreError::NotFound { collection, id })
            | CoreError::Fetch {
                source: StoreError::NotFound { collection, id },
                ..
            } => AppError::NotFoundError(format!("{}/{}", collection, id)),
            other => AppError::InternalServerError(other.to_string()),
        }
    }

    pub fn booking(err: BookingError) -> Self {
        match err {
            BookingError::Unauthenticated => AppError::AuthenticationError(err.to_string()),
            other => AppError::ValidationError(other.to_string()),
        }
    }

    pub fn view(err: ViewError) -> Self {
        match err {
            ViewError::Booking(e) => AppError::booking(e),
            ViewError::Core(e) => AppError::core(e),
            ViewError::Upload(e) => AppError::InternalServerError(e.to_string()),
            ViewError::NeedsAuthentication => AppError::AuthenticationError(err.to_string()),
            ViewError::Forbidden => AppError::AuthorizationError(err.to_string()),
            ViewError::FormClosed => AppError::ConflictError(err.to_string()),
            ViewError::NotFound(what) => AppError::NotFoundError(what),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
