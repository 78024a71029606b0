pub mod entry;
pub mod trips;

use axum::{response::Redirect, routing::get, Router};
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/trips") }))
        .nest("/trips", trips::router().merge(entry::router()))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}
