//! Authentication Middleware
//!
//! Session cookie validation for protected routes.

use crate::cookie::find_cookie;
use crate::error::AuthError;
use crate::handlers::AuthState;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Require a valid session cookie
///
/// Verifies the token carried by the session cookie and stores its claims in
/// request extensions for use by extractors.
pub async fn require_session(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = find_cookie(req.headers(), auth.sessions().cookie_name());
    let claims = auth.sessions().verify(token.as_deref())?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
