//! Authentication HTTP Handlers
//!
//! REST API endpoints for registration, login, identity check and logout.

use crate::cookie::CookieDirectives;
use crate::error::AuthError;
use crate::extractors::SessionUser;
use crate::middleware;
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

// ============================================
// Route Builder
// ============================================

/// Create authentication routes
pub fn create_routes(auth_service: AuthState) -> Result<Router, AuthError> {
    let cors = cors_layer(&auth_service.config().client_origin)?;

    // Public routes (no session required)
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout));

    // Protected routes (require a valid session cookie)
    let protected = Router::new()
        .route("/api/me", get(get_current_user))
        .layer(axum_middleware::from_fn_with_state(
            auth_service.clone(),
            middleware::require_session,
        ));

    Ok(Router::new()
        .merge(public)
        .merge(protected)
        .fallback(not_found)
        .layer(cors)
        .with_state(auth_service))
}

/// Credentialed CORS for the single front-end origin
fn cors_layer(client_origin: &str) -> Result<CorsLayer, AuthError> {
    let origin = HeaderValue::from_str(client_origin)
        .map_err(|_| AuthError::Config("CLIENT_ORIGIN is not a valid origin".to_string()))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Response carrying a `Set-Cookie` header
fn with_cookie(
    status: StatusCode,
    cookie: &CookieDirectives,
    body: impl IntoResponse,
) -> Result<Response, AuthError> {
    let cookie = cookie.to_header_value()?;
    Ok((status, [(header::SET_COOKIE, cookie)], body).into_response())
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload.map(|Json(req)| req).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AuthError::Validation("Email and password are required".to_string())
    })
}

// ============================================
// Health
// ============================================

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

// ============================================
// Registration
// ============================================

/// POST /api/auth/register
///
/// Register a new user account and log it in
pub async fn register(
    State(auth): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, AuthError> {
    let req = json_body(payload)?;
    let (user, session) = auth.register(req).await?;

    with_cookie(StatusCode::CREATED, &session.cookie, Json(UserResponse::from(&user)))
}

// ============================================
// Login / Logout
// ============================================

/// POST /api/auth/login
///
/// Check credentials and set the session cookie
pub async fn login(
    State(auth): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AuthError> {
    let req = json_body(payload)?;
    let (user, session) = auth.login(req).await?;

    with_cookie(StatusCode::OK, &session.cookie, Json(UserResponse::from(&user)))
}

/// POST /api/auth/logout
///
/// Clear the session cookie. The presented cookie is not inspected.
pub async fn logout(State(auth): State<AuthState>) -> Result<Response, AuthError> {
    tracing::info!("User logged out");

    with_cookie(
        StatusCode::OK,
        &auth.logout(),
        Json(MessageResponse::new("Logged out")),
    )
}

// ============================================
// User Profile
// ============================================

/// GET /api/me
///
/// Get current user profile
pub async fn get_current_user(
    State(auth): State<AuthState>,
    user: SessionUser,
) -> Result<Json<ProfileResponse>, AuthError> {
    let me = auth.credentials().find_by_id(user.id).await?;
    Ok(Json(ProfileResponse::from(me)))
}

// ============================================
// Fallback
// ============================================

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "not_found",
            "message": "Not found"
        })),
    )
}
