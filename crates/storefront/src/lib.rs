//! Shanga storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_sessions::SessionStore;

use crate::middleware::session::{SessionLayerError, configure};
use crate::state::AppState;

/// Build the storefront application with sessions kept in `store`.
///
/// Tracing and Sentry layers are added by the binary.
///
/// # Errors
///
/// Returns `SessionLayerError` if the session secret cannot sign cookies.
pub fn app<S: SessionStore + Clone>(state: AppState, store: S) -> Result<Router, SessionLayerError> {
    let session_layer = configure(store, state.config())?;

    Ok(routes::routes()
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .with_state(state))
}
