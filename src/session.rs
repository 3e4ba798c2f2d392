//! Session Authority
//!
//! Mints and verifies stateless HS256 session tokens and decides how they are
//! carried in the session cookie. Nothing is stored server-side: a token is
//! valid while its signature checks out and its expiry has not passed.
//!
//! The token always lives for the full session TTL. "Remember me" only
//! decides whether the cookie wrapping it gets a `Max-Age`; without it the
//! browser drops the cookie when it closes, but a copied token value remains
//! usable until its own expiry.

use crate::config::AuthConfig;
use crate::cookie::CookieDirectives;
use crate::error::AuthError;
use crate::models::SessionClaims;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// Token plus the cookie that should carry it
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
    pub cookie: CookieDirectives,
}

/// Issues and checks session tokens
pub struct SessionAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
    cookie_name: String,
    secure_cookies: bool,
}

impl SessionAuthority {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let ttl = Duration::try_seconds(config.session_ttl)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| AuthError::Config("SESSION_TTL is out of range".to_string()))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            ttl,
            cookie_name: config.cookie_name.clone(),
            secure_cookies: config.secure_cookies(),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a session for a user at the current time
    pub fn issue(
        &self,
        user_id: i64,
        email: &str,
        remember_me: bool,
    ) -> Result<IssuedSession, AuthError> {
        self.issue_at(user_id, email, remember_me, Utc::now())
    }

    /// Issue a session as of `now`
    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        remember_me: bool,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AuthError> {
        let exp = now.checked_add_signed(self.ttl).ok_or_else(|| {
            tracing::error!("Session expiry overflows the calendar");
            AuthError::Internal
        })?;

        let claims = SessionClaims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        let max_age = remember_me.then_some(self.ttl);
        let cookie = CookieDirectives::session(
            &self.cookie_name,
            token.clone(),
            self.secure_cookies,
            max_age,
            now,
        );

        Ok(IssuedSession {
            token,
            claims,
            cookie,
        })
    }

    /// Verify a presented token at the current time
    pub fn verify(&self, token: Option<&str>) -> Result<SessionClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a presented token as of `now`
    pub fn verify_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, AuthError> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::MissingToken),
        };

        // Expiry is checked below against the supplied clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_exp = false;

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)?.claims;

        if now.timestamp() >= claims.exp {
            tracing::debug!(user_id = claims.sub, "Session token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    /// Directive clearing the session cookie on the client.
    ///
    /// The token itself stays valid for anyone else holding it.
    pub fn revoke(&self) -> CookieDirectives {
        CookieDirectives::clear(&self.cookie_name, self.secure_cookies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn authority() -> SessionAuthority {
        SessionAuthority::new(&test_config()).unwrap()
    }

    fn authority_with(config: AuthConfig) -> SessionAuthority {
        SessionAuthority::new(&config).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let authority = authority();
        let session = authority.issue(1, "bob@example.com", false).unwrap();

        let claims = authority.verify(Some(&session.token)).unwrap();
        assert_eq!(claims.user_id(), 1);
        assert_eq!(claims.email, "bob@example.com");
    }

    #[test]
    fn test_missing_token() {
        let authority = authority();
        assert_eq!(authority.verify(None).unwrap_err(), AuthError::MissingToken);
        assert_eq!(authority.verify(Some("")).unwrap_err(), AuthError::MissingToken);
    }

    #[test]
    fn test_token_expires_after_seven_days() {
        let authority = authority();
        let issued_at = Utc::now();
        let session = authority.issue_at(1, "bob@example.com", true, issued_at).unwrap();

        let almost = issued_at + Duration::days(7) - Duration::seconds(1);
        assert!(authority.verify_at(Some(&session.token), almost).is_ok());

        let later = issued_at + Duration::days(7) + Duration::seconds(1);
        assert_eq!(
            authority.verify_at(Some(&session.token), later).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let authority = authority();
        let token = authority.issue(1, "bob@example.com", false).unwrap().token;

        // Flip one character inside the signature segment
        let mut bytes = token.into_bytes();
        let idx = bytes.len() - 10;
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(
            authority.verify(Some(&tampered)).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = authority_with(AuthConfig {
            jwt_secret: "b".repeat(32),
            ..test_config()
        });
        let token = other.issue(1, "bob@example.com", false).unwrap().token;

        assert_eq!(
            authority().verify(Some(&token)).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_malformed_token_rejected() {
        let authority = authority();

        for token in ["not-a-jwt", "a.b.c", "...."] {
            assert_eq!(
                authority.verify(Some(token)).unwrap_err(),
                AuthError::InvalidToken
            );
        }
    }

    #[test]
    fn test_token_for_other_issuer_rejected() {
        let other = authority_with(AuthConfig {
            jwt_issuer: "someone-else".to_string(),
            ..test_config()
        });
        let token = other.issue(1, "bob@example.com", false).unwrap().token;

        assert_eq!(
            authority().verify(Some(&token)).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_token_for_other_audience_rejected() {
        let other = authority_with(AuthConfig {
            jwt_audience: "another-app".to_string(),
            ..test_config()
        });
        let token = other.issue(1, "bob@example.com", false).unwrap().token;

        assert_eq!(
            authority().verify(Some(&token)).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_out_of_range_ttl_is_config_error() {
        for ttl in [0, i64::MAX / 1000 + 1, i64::MAX] {
            let result = SessionAuthority::new(&AuthConfig {
                session_ttl: ttl,
                ..test_config()
            });
            assert!(matches!(result, Err(AuthError::Config(_))), "ttl {} accepted", ttl);
        }
    }

    #[test]
    fn test_expiry_overflow_is_internal_error() {
        let authority = authority();
        let end_of_time = DateTime::<Utc>::MAX_UTC;

        assert_eq!(
            authority
                .issue_at(1, "bob@example.com", true, end_of_time)
                .unwrap_err(),
            AuthError::Internal
        );
    }

    #[test]
    fn test_remember_me_sets_max_age() {
        let authority = authority();
        let session = authority.issue(1, "bob@example.com", true).unwrap();

        assert_eq!(session.cookie.max_age, Some(authority.ttl()));
        assert_eq!(authority.ttl(), Duration::days(7));
        assert!(session.cookie.is_persistent());
        assert!(session.cookie.http_only);
    }

    #[test]
    fn test_session_cookie_still_wraps_seven_day_token() {
        let authority = authority();
        let now = Utc::now();
        let session = authority.issue_at(1, "bob@example.com", false, now).unwrap();

        assert_eq!(session.cookie.max_age, None);
        assert_eq!(session.cookie.expires, None);

        let claims = authority.verify_at(Some(&session.cookie.value), now).unwrap();
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
        assert_eq!(
            claims.expires_at().unwrap().timestamp(),
            (now + Duration::days(7)).timestamp()
        );
    }

    #[test]
    fn test_revoke_clears_cookie() {
        let authority = authority();
        let cookie = authority.revoke();

        assert_eq!(cookie.name, "token");
        assert!(cookie.value.is_empty());
        assert_eq!(cookie.max_age, Some(Duration::zero()));
        assert!(cookie.http_only);
    }
}
