//! Session Authentication
//!
//! Email/password authentication with stateless cookie sessions:
//! - User registration and login
//! - Argon2id password hashing
//! - Signed JWT session tokens carried in an HTTP-only cookie
//! - "Remember me" persistent cookies vs browser-session cookies
//! - Identity check and logout
//!
//! Users live in a volatile in-memory store behind [`UserRepository`], so
//! another backend can be plugged in without touching the session logic.
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `APP_ENV` - `production` enables `Secure` cookies (default: development)
//! - `PORT` - HTTP listen port (default: 5000)
//! - `CLIENT_ORIGIN` - origin allowed by CORS (default: "http://localhost:5173")
//! - `JWT_SECRET` - Secret key for signing JWTs (required in production, min 32 chars)
//! - `SESSION_TTL` - Session token lifetime in seconds (default: 604800)
//! - `SESSION_COOKIE_NAME` - Session cookie name (default: "token")
//!
//! # Usage
//!
//! ```rust,ignore
//! use session_auth::{create_routes, AuthConfig, AuthService};
//! use std::sync::Arc;
//!
//! let config = AuthConfig::from_env();
//! let auth = Arc::new(AuthService::in_memory(config)?);
//! let app = create_routes(auth)?;
//! ```

pub mod config;
pub mod cookie;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod service;
pub mod session;

// Re-export commonly used types
pub use config::{AuthConfig, Environment};
pub use cookie::CookieDirectives;
pub use credentials::CredentialStore;
pub use error::AuthError;
pub use extractors::SessionUser;
pub use handlers::{create_routes, AuthState};
pub use models::*;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::AuthService;
pub use session::{IssuedSession, SessionAuthority};
