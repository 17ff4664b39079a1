//! Router Module Index
//!
//! Splits the page routes by access level, so that the authentication guard
//! is applied to a whole module at once instead of per handler.

use axum::{
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

/// Routes reachable by any caller, anonymous or signed in.
pub mod public;

/// Routes behind the `login_required` layer.
pub mod authenticated;

/// NamedRoute
///
/// A path paired with the name it is reversed by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedRoute {
    pub name: &'static str,
    pub path: &'static str,
}

pub const INDEX: NamedRoute = NamedRoute {
    name: "index",
    path: "/",
};

pub const PROTECTED: NamedRoute = NamedRoute {
    name: "protected",
    path: "/protected/",
};

/// Every page route the application serves.
pub const ROUTES: [NamedRoute; 2] = [INDEX, PROTECTED];

/// reverse
///
/// Resolves a route name to its path, e.g. `reverse("protected") == Some("/protected/")`.
pub fn reverse(name: &str) -> Option<&'static str> {
    ROUTES
        .iter()
        .find(|route| route.name == name)
        .map(|route| route.path)
}

/// not_found
///
/// Fallback for paths no route matched. A `GET`/`HEAD` for a known page with
/// its trailing slash missing gets a permanent redirect to the slashed path;
/// anything else is a 404.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    let path = uri.path();

    if (method == Method::GET || method == Method::HEAD) && !path.ends_with('/') {
        let slashed = format!("{path}/");
        if ROUTES.iter().any(|route| route.path == slashed) {
            let location = match uri.query() {
                Some(query) => format!("{slashed}?{query}"),
                None => slashed,
            };
            return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
        }
    }

    tracing::debug!(%method, path, "no route matched");
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
