//! Session middleware configuration.
//!
//! Sessions are stored in `PostgreSQL` via tower-sessions. The cookie only
//! carries the session id, signed with the configured secret.

use secrecy::ExposeSecret;
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shanga_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Errors building the session layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionLayerError {
    /// The signing secret is too short to derive a cookie key.
    #[error("session secret cannot be used as a signing key: {0}")]
    InvalidKey(#[from] tower_sessions::cookie::KeyError),
}

/// Build the session layer over any session store.
///
/// The binary passes a `PostgresStore`, whose `tower_sessions.session` table
/// is created by `shanga-cli migrate`.
///
/// # Errors
///
/// Returns `SessionLayerError::InvalidKey` if the session secret is shorter
/// than 64 bytes.
pub fn configure<S: SessionStore>(
    store: S,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<S, SignedCookie>, SessionLayerError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
