use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
    response::IntoResponse,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use simpleapp::{
    AppState,
    auth::{AuthUser, Claims, LoginRedirect},
    config::{AppConfig, Env},
};
use std::time::SystemTime;
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn create_token(user_id: Uuid, exp: u64, secret: &str) -> String {
    let claims = Claims {
        sub: user_id,
        iat: now() as usize,
        exp: exp as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(env: Env) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = TEST_JWT_SECRET.to_string();
    AppState::from_config(config)
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(mut parts: Parts, token: &str) -> Parts {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = create_token(TEST_USER_ID, now() + 3600, TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Production);

    let mut parts = with_bearer(
        get_request_parts(Method::GET, "/protected/".parse().unwrap()),
        &token,
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap(), AuthUser { id: TEST_USER_ID });
}

#[tokio::test]
async fn test_auth_failure_with_missing_header_redirects_to_login() {
    let app_state = create_app_state(Env::Production);

    let mut parts = get_request_parts(Method::GET, "/protected/".parse().unwrap());

    let rejection = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();

    assert_eq!(rejection.location(), "/accounts/login/?next=/protected/");

    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/accounts/login/?next=/protected/"
    );
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    // Well past the default validation leeway.
    let token = create_token(TEST_USER_ID, now() - 3600, TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Production);

    let mut parts = with_bearer(
        get_request_parts(Method::GET, "/protected/".parse().unwrap()),
        &token,
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
}

#[tokio::test]
async fn test_auth_failure_with_wrong_secret() {
    let token = create_token(TEST_USER_ID, now() + 3600, "some-other-secret");
    let app_state = create_app_state(Env::Production);

    let mut parts = with_bearer(
        get_request_parts(Method::GET, "/protected/".parse().unwrap()),
        &token,
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
}

#[tokio::test]
async fn test_auth_failure_with_non_bearer_scheme() {
    let app_state = create_app_state(Env::Production);

    let mut parts = get_request_parts(Method::GET, "/protected/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Basic dXNlcjpwYXNz"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
}

#[tokio::test]
async fn test_local_bypass_success() {
    let mock_user_id = Uuid::new_v4();
    let app_state = create_app_state(Env::Local);

    let mut parts = get_request_parts(Method::GET, "/protected/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap().id, mock_user_id);
}

#[tokio::test]
async fn test_local_bypass_with_malformed_id_falls_through_to_token() {
    let token = create_token(TEST_USER_ID, now() + 3600, TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Local);

    let mut parts = with_bearer(
        get_request_parts(Method::GET, "/protected/".parse().unwrap()),
        &token,
    );
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_static("not-a-uuid"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap().id, TEST_USER_ID);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let mock_user_id = Uuid::new_v4();
    let app_state = create_app_state(Env::Production);

    let mut parts = get_request_parts(Method::GET, "/protected/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
}

#[tokio::test]
async fn test_redirect_keeps_original_query_in_next() {
    let app_state = create_app_state(Env::Production);

    let mut parts = get_request_parts(Method::GET, "/protected/?tab=a%20b".parse().unwrap());

    let rejection = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();

    assert_eq!(
        rejection.location(),
        "/accounts/login/?next=/protected/%3Ftab%3Da%2520b"
    );
}

#[test]
fn test_login_redirect_appends_to_existing_query() {
    let redirect = LoginRedirect::new("/sso/start?provider=corp", "/protected/");

    assert_eq!(
        redirect.location(),
        "/sso/start?provider=corp&next=/protected/"
    );
}

#[test]
fn test_login_redirect_escapes_reserved_but_keeps_unreserved() {
    let redirect = LoginRedirect::new("/accounts/login/", "/protected/~a*b c");

    assert_eq!(
        redirect.location(),
        "/accounts/login/?next=/protected/~a%2Ab%20c"
    );
}

#[test]
fn test_login_redirect_replaces_existing_next() {
    let redirect = LoginRedirect::new(
        "/sso/start?next=/elsewhere/&provider=corp&next=/again/",
        "/protected/",
    );

    assert_eq!(
        redirect.location(),
        "/sso/start?next=/protected/&provider=corp"
    );
}
