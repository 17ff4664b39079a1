use axum::response::Html;

use crate::templates::{self, RenderError};

/// index
///
/// [Public Route] Renders the landing page.
pub async fn index() -> Result<Html<String>, RenderError> {
    templates::render(templates::SIMPLEAPP)
}

/// protected
///
/// [Authenticated Route] Renders the members-only page.
///
/// *Note*: Authentication is enforced by the `login_required` layer on the
/// authenticated router; this handler assumes the caller is already admitted.
pub async fn protected() -> Result<Html<String>, RenderError> {
    templates::render(templates::PROTECTED)
}
