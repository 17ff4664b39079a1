use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use uuid::Uuid;

use crate::config::{AppConfig, Env};

/// Query parameter carrying the page the caller originally asked for.
pub const REDIRECT_FIELD_NAME: &str = "next";

/// Bytes left bare in the login query: unreserved characters and `/`.
const QUERY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Header accepted as a stand-in for a token while running locally.
pub const LOCAL_BYPASS_HEADER: &str = "x-user-id";

/// Claims
///
/// Payload expected inside the bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the caller's identifier.
    pub sub: Uuid,
    /// Expiration Time (exp): always validated.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Only exists for callers
/// the configured `Authenticator` admitted.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Authenticator
///
/// The authentication capability the guard consumes. The guard neither knows
/// nor cares how a caller is recognized, only whether one is.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns the caller's identity, or `None` for anonymous requests.
    async fn authenticate(&self, parts: &Parts) -> Option<AuthUser>;
}

/// Shared handle to the authenticator, pulled out of `AppState` via `FromRef`.
pub type AuthState = Arc<dyn Authenticator>;

/// TokenAuthenticator
///
/// Recognizes callers by an HS256-signed `Authorization: Bearer` token.
/// In `Env::Local` a valid UUID in the `x-user-id` header is accepted instead.
pub struct TokenAuthenticator {
    env: Env,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenAuthenticator {
    pub fn new(config: &AppConfig) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            env: config.env.clone(),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    fn local_bypass(&self, parts: &Parts) -> Option<AuthUser> {
        if self.env != Env::Local {
            return None;
        }
        let raw = parts.headers.get(LOCAL_BYPASS_HEADER)?.to_str().ok()?;
        let id = Uuid::parse_str(raw).ok()?;
        Some(AuthUser { id })
    }

    fn bearer(&self, parts: &Parts) -> Option<AuthUser> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;

        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(AuthUser {
                id: data.claims.sub,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "rejected bearer token");
                None
            }
        }
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, parts: &Parts) -> Option<AuthUser> {
        // The bypass falls through to token validation when absent or malformed.
        self.local_bypass(parts).or_else(|| self.bearer(parts))
    }
}

/// LoginRedirect
///
/// Rejection produced for anonymous callers: a `302 Found` to the login flow,
/// carrying the originally requested location in `next`.
#[derive(Debug)]
pub struct LoginRedirect {
    location: String,
}

impl LoginRedirect {
    /// Builds the redirect to `login_url` with `next` set in its query.
    ///
    /// Any `next` already present in `login_url` is overwritten in place, and
    /// every key and value is re-encoded with `QUERY_SAFE`.
    pub fn new(login_url: &str, next: &str) -> Self {
        let (base, query) = login_url.split_once('?').unwrap_or((login_url, ""));

        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut has_next = false;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key == REDIRECT_FIELD_NAME {
                if !has_next {
                    has_next = true;
                    pairs.push((key.into_owned(), next.to_string()));
                }
            } else {
                pairs.push((key.into_owned(), value.into_owned()));
            }
        }
        if !has_next {
            pairs.push((REDIRECT_FIELD_NAME.to_string(), next.to_string()));
        }

        let query = pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY_SAFE),
                    utf8_percent_encode(value, QUERY_SAFE)
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        Self {
            location: format!("{base}?{query}"),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.location)]).into_response()
    }
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler or middleware argument. Rejects with a
/// `LoginRedirect` when the authenticator does not recognize the caller.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        // The authentication capability is whatever the application state carries;
        // this extractor never inspects credentials itself.
        let authenticator = AuthState::from_ref(state);

        // 2. Identity Check
        // An admitted caller proceeds straight to the guarded handler.
        if let Some(user) = authenticator.authenticate(parts).await {
            return Ok(user);
        }

        // 3. Login Redirect
        // Anonymous callers are sent to the configured login flow, carrying the
        // requested path and query so the login flow can send them back.
        let config = AppConfig::from_ref(state);
        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        tracing::debug!(next, "anonymous request to guarded route, redirecting to login");
        Err(LoginRedirect::new(&config.login_url, next))
    }
}
