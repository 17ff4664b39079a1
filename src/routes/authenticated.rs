use crate::{AppState, handlers, routes::PROTECTED};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Pages that must only be reached by signed-in callers. The router returned
/// here carries no guard itself; `create_router` wraps it in the
/// `login_required` layer, which redirects anonymous callers to the login flow
/// before any handler in this module runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /protected/
        // Members-only page (protected.html).
        .route(PROTECTED.path, get(handlers::protected))
}
