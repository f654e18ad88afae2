//! API routes.

pub mod health;
pub mod options;
pub mod sources;

use crate::AppState;
use axum::Router;
use axum::routing::get;

/// Build the main API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_router())
        .merge(health::router())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/sources", sources::router())
        .route("/options", get(options::list_options))
}
