use axum::{extract::State, routing::get, Json, Router};
use globetrail_catalog::content::{HeroSlide, Testimonial};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/content/hero-slides", get(hero_slides))
        .route("/v1/content/testimonials", get(testimonials))
}

async fn hero_slides(State(state): State<AppState>) -> Json<Vec<HeroSlide>> {
    Json(state.content.hero_slides().await)
}

async fn testimonials(State(state): State<AppState>) -> Json<Vec<Testimonial>> {
    Json(state.content.testimonials().await)
}
