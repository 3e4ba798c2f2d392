//! Session cookie transport
//!
//! Builds `Set-Cookie` values for the session token and reads the token
//! back out of `Cookie` request headers.

use crate::error::AuthError;

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, Duration, Utc};

/// Instructions for the client on how to store (or drop) the session cookie.
///
/// Always rendered `SameSite=Lax`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDirectives {
    pub name: String,
    pub value: String,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    /// `None` makes a browser-session cookie
    pub max_age: Option<Duration>,
    pub expires: Option<DateTime<Utc>>,
}

impl CookieDirectives {
    /// Session cookie carrying `value`; persistent only when `max_age` is set
    pub fn session(
        name: &str,
        value: String,
        secure: bool,
        max_age: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.to_string(),
            value,
            path: "/".to_string(),
            http_only: true,
            secure,
            max_age,
            expires: max_age.map(|age| now + age),
        }
    }

    /// Directive removing the named cookie, with the same flags it was set with
    pub fn clear(name: &str, secure: bool) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
            path: "/".to_string(),
            http_only: true,
            secure,
            max_age: Some(Duration::zero()),
            expires: DateTime::from_timestamp(0, 0),
        }
    }

    /// Whether the cookie survives a browser restart
    pub fn is_persistent(&self) -> bool {
        self.max_age.is_some_and(|age| age > Duration::zero())
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header_string(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);

        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out.push_str("; SameSite=Lax");
        if self.secure {
            out.push_str("; Secure");
        }
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={}", max_age.num_seconds()));
        }
        if let Some(expires) = self.expires {
            out.push_str(&format!(
                "; Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }

        out
    }

    pub fn to_header_value(&self) -> Result<HeaderValue, AuthError> {
        HeaderValue::from_str(&self.to_header_string()).map_err(|e| {
            tracing::error!("Unencodable Set-Cookie value: {}", e);
            AuthError::Internal
        })
    }
}

/// Value of the named cookie from the request's `Cookie` headers
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}
