//! Authentication Extractors
//!
//! Axum extractors for the session identity.
//!
//! `SessionUser` works behind `require_session`, where it reuses the claims
//! the middleware stored, and on its own, where it reads and verifies the
//! session cookie itself.

use crate::cookie::find_cookie;
use crate::error::AuthError;
use crate::handlers::AuthState;
use crate::models::SessionClaims;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

/// Identity carried by a verified session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
}

impl SessionUser {
    /// Create user from JWT claims
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Claims already validated by middleware
        if let Some(claims) = parts.extensions.get::<SessionClaims>() {
            return Ok(SessionUser::from_claims(claims));
        }

        let auth = AuthState::from_ref(state);
        let token = find_cookie(&parts.headers, auth.sessions().cookie_name());
        let claims = auth.sessions().verify(token.as_deref())?;

        Ok(SessionUser::from_claims(&claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::service::AuthService;

    use axum::http::{header, Request};
    use std::sync::Arc;

    fn state() -> AuthState {
        Arc::new(AuthService::in_memory(test_config()).unwrap())
    }

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/me");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_extracts_from_cookie_without_middleware() {
        let state = state();
        let session = state.sessions().issue(7, "bob@example.com", false).unwrap();
        let mut parts = parts_with_cookie(Some(&format!("theme=dark; token={}", session.token)));

        let user = SessionUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(
            user,
            SessionUser {
                id: 7,
                email: "bob@example.com".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_cookie_rejected_without_middleware() {
        let state = state();
        let mut parts = parts_with_cookie(None);

        let err = SessionUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MissingToken);
    }

    #[tokio::test]
    async fn test_invalid_cookie_rejected_without_middleware() {
        let state = state();
        let mut parts = parts_with_cookie(Some("token=not-a-jwt"));

        let err = SessionUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_prefers_claims_from_extensions() {
        let state = state();
        let session = state.sessions().issue(3, "ann@example.com", false).unwrap();
        let mut parts = parts_with_cookie(None);
        parts.extensions.insert(session.claims);

        let user = SessionUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(user.id, 3);
    }
}
