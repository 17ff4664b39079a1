use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod handlers;
pub mod templates;

// Page routes, split by access level (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use auth::{AuthState, Authenticator, TokenAuthenticator};
pub use config::AppConfig;
pub use routes::reverse;

/// AppState
///
/// The single, immutable container shared by every request: the
/// authentication capability and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    /// Decides whether a request's caller is authenticated.
    pub auth: AuthState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Builds the production state: token authentication keyed by `config`.
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            auth: Arc::new(TokenAuthenticator::new(&config)),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AuthState {
    fn from_ref(app_state: &AppState) -> AuthState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// login_required
///
/// Guard for the `authenticated_routes`. Extracting `AuthUser` either admits
/// the request or rejects it with a redirect to the login flow, in which case
/// the wrapped handler never runs.
async fn login_required(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the page routes, applies the guard to the authenticated group and
/// wraps everything in the request-id and tracing layers.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 1. Base Router Assembly
    let base_router = Router::new()
        // 1a. Public Routes: No middleware applied.
        .merge(public::public_routes())
        // 1b. Authenticated Routes: Guarded by `login_required`.
        // `route_layer` keeps the guard off unmatched paths, so they still 404
        // instead of redirecting to the login flow.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                login_required,
            )),
        )
        // 1c. Fallback: trailing-slash redirect or 404 for everything else.
        .fallback(routes::not_found)
        .with_state(state);

    // 2. Observability and Correlation Layers (Applied outermost/first)
    base_router.layer(
        ServiceBuilder::new()
            // 2a. Request ID Generation: a UUID for every incoming request.
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            // 2b. Request Tracing: one span per request, tagged by `trace_span_logger`.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // 2c. Request ID Propagation: echoes x-request-id back to the client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with method, URI and the `x-request-id`
/// set by `SetRequestIdLayer`, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
