//! Cart route handlers.
//!
//! Mutations respond with `HX-Trigger: cart-updated` so a page can refresh
//! its badge; other tabs follow along through `GET /cart/events`.

use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::{
        AppendHeaders, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tower_sessions::Session;
use tracing::instrument;

use shanga_core::{CartLineItem, ProductId, Quantity};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::Owner;
use crate::services::cart::CartEvent;
use crate::state::AppState;

const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<Quantity>,
}

/// Update quantity request body.
///
/// The quantity is signed so that zero and negative requests reach the
/// service, which ignores them.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// Response for `POST /cart/update`.
#[derive(Debug, Serialize)]
pub struct UpdateCartResponse {
    pub updated: bool,
    pub line: Option<CartLineItem>,
}

/// Current cart with totals.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    Owner(owner): Owner,
    session: Session,
) -> Result<impl IntoResponse> {
    let summary = state.cart(owner, session).summary().await?;
    Ok(Json(summary))
}

/// Cart badge count (number of line items).
#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    Owner(owner): Owner,
    session: Session,
) -> Result<impl IntoResponse> {
    let count = state.cart(owner, session).count().await?;
    Ok(Json(json!({ "count": count })))
}

/// Add a product to the cart, merging into an existing line.
///
/// The product snapshot is always resolved from the catalog, so an unknown
/// product is a 404 for every owner.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    Owner(owner): Owner,
    session: Session,
    Json(form): Json<AddToCartRequest>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(Quantity::ONE);

    let product = state
        .catalog()
        .product(&form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let line = state
        .cart(owner, session)
        .add_or_increment(&form.product_id, quantity, Some(&product))
        .await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", form.product_id.as_str())]),
    );

    Ok((AppendHeaders([CART_UPDATED]), Json(line)).into_response())
}

/// Overwrite a line's quantity. Quantities below one change nothing.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn update(
    State(state): State<AppState>,
    Owner(owner): Owner,
    session: Session,
    Json(form): Json<UpdateCartRequest>,
) -> Result<Response> {
    let line = state
        .cart(owner, session)
        .set_quantity(&form.product_id, form.quantity)
        .await?;

    let body = Json(UpdateCartResponse {
        updated: line.is_some(),
        line,
    });

    if body.updated {
        add_breadcrumb(
            "cart",
            "Updated cart quantity",
            Some(&[("product_id", form.product_id.as_str())]),
        );
        Ok((AppendHeaders([CART_UPDATED]), body).into_response())
    } else {
        Ok(body.into_response())
    }
}

/// Remove a product's line from the cart.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    Owner(owner): Owner,
    session: Session,
    Json(form): Json<RemoveFromCartRequest>,
) -> Result<Response> {
    let removed = state
        .cart(owner, session)
        .remove_line(&form.product_id)
        .await?;

    let body = Json(json!({ "removed": removed }));
    if removed {
        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[("product_id", form.product_id.as_str())]),
        );
        Ok((AppendHeaders([CART_UPDATED]), body).into_response())
    } else {
        Ok(body.into_response())
    }
}

/// Stream cart notices for the caller's cart as server-sent events.
///
/// A subscriber that falls behind gets one `cart-updated` in place of the
/// notices it missed; re-reading the cart catches it up.
#[instrument(skip(state))]
pub async fn events(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>> {
    let mut receiver = state.cart_events().subscribe();

    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(notice) if notice.concerns(owner) => {
                    yield Ok(Event::default().event(notice.event.name()).data(notice.event.name()));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Cart event subscriber lagged");
                    let name = CartEvent::CartUpdated.name();
                    yield Ok(Event::default().event(name).data(name));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
