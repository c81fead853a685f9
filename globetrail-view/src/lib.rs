//! Per-page controllers. Each owns its page state exclusively and publishes
//! it through a `watch` channel for rendering. Background work holds only a
//! weak handle to that state, so completions arriving after the controller
//! is dropped are discarded.

pub mod admin;
pub mod dashboard;
pub mod detail;
pub mod listing;

pub use admin::{AdminController, AdminForm, AdminItem, AdminState, AdminTab, ImageUpload};
pub use dashboard::{DashboardController, DashboardState};
pub use detail::{BookAction, DetailController, DetailPhase, DetailState};
pub use listing::{ListingController, ListingQuery, ListingState, PAGE_SIZE};

use globetrail_core::{AuthError, CoreError, UploadError};
use globetrail_order::BookingError;
use std::sync::{Arc, Weak};
use tokio::sync::watch;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Sign in to continue")]
    NeedsAuthentication,

    #[error("Admin access required")]
    Forbidden,

    #[error("Booking form is not open")]
    FormClosed,

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<AuthError> for ViewError {
    fn from(err: AuthError) -> Self {
        ViewError::Core(CoreError::Auth(err))
    }
}

/// Page state shared between a controller and its background tasks.
pub(crate) type Shared<S> = Arc<watch::Sender<S>>;

/// Applies `f` if the owning controller is still alive.
pub(crate) fn update_if_alive<S>(state: &Weak<watch::Sender<S>>, f: impl FnOnce(&mut S)) -> bool {
    match state.upgrade() {
        Some(state) => {
            state.send_modify(f);
            true
        }
        None => {
            tracing::debug!("View torn down, dropping completion");
            false
        }
    }
}
