use crate::{AppState, handlers, routes::INDEX};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Pages served to every caller without any identity check.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Landing page (simpleapp.html).
        .route(INDEX.path, get(handlers::index))
}
