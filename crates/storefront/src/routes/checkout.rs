//! Checkout route handler.

use axum::{Json, extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use shanga_core::OwnerContext;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Pay for the signed-in customer's cart.
///
/// The payment is simulated. The cart is left as it was.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let summary = state
        .cart(OwnerContext::Authenticated(user.id), session)
        .summary()
        .await?;

    add_breadcrumb("checkout", "Payment started", None);
    let receipt = state.checkout().pay(&summary).await?;

    Ok(Json(receipt))
}
