use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Landing page, served at the site root.
pub const SIMPLEAPP: &str = "simpleapp.html";
/// Page shown only to authenticated callers.
pub const PROTECTED: &str = "protected.html";

#[derive(Template)]
#[template(path = "simpleapp.html")]
struct SimpleAppPage;

#[derive(Template)]
#[template(path = "protected.html")]
struct ProtectedPage;

/// RenderError
///
/// Failure to turn a template name into markup. Surfaces to the client as a 500.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template not found: {0}")]
    NotFound(String),
    #[error("failed to render {name}: {source}")]
    Engine {
        name: &'static str,
        #[source]
        source: askama::Error,
    },
}

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "template rendering failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
    }
}

/// render
///
/// Resolves a template name to its compiled template and renders it without
/// any context data.
pub fn render(name: &str) -> Result<Html<String>, RenderError> {
    let result = match name {
        SIMPLEAPP => SimpleAppPage.render().map_err(|source| RenderError::Engine {
            name: SIMPLEAPP,
            source,
        }),
        PROTECTED => ProtectedPage.render().map_err(|source| RenderError::Engine {
            name: PROTECTED,
            source,
        }),
        other => Err(RenderError::NotFound(other.to_string())),
    };
    result.map(Html)
}
