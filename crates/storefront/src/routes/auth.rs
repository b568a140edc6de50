//! Authentication route handlers.
//!
//! Signing in or out swaps which cart the session's requests act on; the
//! anonymous cart stays in the session untouched.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{Owner, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Email and password credentials.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Create an account and sign it in.
#[instrument(skip(state, owner, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    Owner(owner): Owner,
    session: Session,
    Json(form): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .register_with_password(&form.email, &form.password)
        .await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    let signed_in = owner.sign_in(current.id);
    set_sentry_user(&current.id, Some(current.email.as_str()));
    tracing::info!(from = %owner, to = %signed_in, "User registered");

    Ok((StatusCode::CREATED, Json(current)))
}

/// Sign in with email and password.
#[instrument(skip(state, owner, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    Owner(owner): Owner,
    session: Session,
    Json(form): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    let signed_in = owner.sign_in(current.id);
    set_sentry_user(&current.id, Some(current.email.as_str()));
    add_breadcrumb("auth", "Signed in", None);
    tracing::info!(from = %owner, to = %signed_in, "Cart owner switched");

    Ok(Json(current))
}

/// Sign out. The session and its anonymous cart are kept.
#[instrument(skip(owner, session))]
pub async fn logout(Owner(owner): Owner, session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session).await?;
    let signed_out = owner.sign_out();
    clear_sentry_user();
    add_breadcrumb("auth", "Signed out", None);
    tracing::info!(from = %owner, to = %signed_out, "Cart owner switched");

    Ok(Json(json!({ "status": "signed_out" })))
}
