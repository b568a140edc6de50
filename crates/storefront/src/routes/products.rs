//! Product and category route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use shanga_core::ProductId;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// List products, optionally narrowed to one category or to featured ones.
///
/// An unknown category yields an empty list.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<impl IntoResponse> {
    let catalog = state.catalog();
    let products = match query.category.as_deref() {
        Some(category) => {
            let in_category = catalog.products_in_category(category).await?;
            if query.featured {
                Arc::new(
                    in_category
                        .iter()
                        .filter(|p| p.featured)
                        .cloned()
                        .collect::<Vec<_>>(),
                )
            } else {
                in_category
            }
        }
        None if query.featured => catalog.featured_products().await?,
        None => catalog.products().await?,
    };

    Ok(Json(products))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let not_found = || AppError::NotFound(format!("product {id}"));
    let product_id = ProductId::parse(&id).map_err(|_| not_found())?;

    let product = state
        .catalog()
        .product(&product_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(product))
}

/// Distinct category names.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.catalog().categories().await?))
}
