//! Wishlist route handlers. All of them require sign-in.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use shanga_core::ProductId;

use crate::db::{RepositoryError, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Add to wishlist request body.
#[derive(Debug, Deserialize)]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

/// Products on the signed-in customer's wishlist.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let products = WishlistRepository::new(state.pool())
        .products(user.id)
        .await?;
    Ok(Json(products))
}

/// Add a product. Adding one that is already present is not an error.
#[instrument(skip(state, user), fields(user_id = %user.id, product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<AddToWishlistRequest>,
) -> Result<impl IntoResponse> {
    let added = WishlistRepository::new(state.pool())
        .add(user.id, &form.product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("product {}", form.product_id))
            }
            other => other.into(),
        })?;

    if added {
        Ok((StatusCode::CREATED, Json(json!({ "status": "added" }))))
    } else {
        Ok((StatusCode::OK, Json(json!({ "status": "already_present" }))))
    }
}

/// Remove a product from the wishlist.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse> {
    let not_found = || AppError::NotFound(format!("wishlist item {product_id}"));
    let id = ProductId::parse(&product_id).map_err(|_| not_found())?;

    let removed = WishlistRepository::new(state.pool())
        .remove(user.id, &id)
        .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}
