//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET  /products               - Product listing (?category=, ?featured=true)
//! GET  /products/{id}          - Product detail
//! GET  /categories             - Distinct category names
//!
//! # Cart
//! GET  /cart                   - Cart lines with totals
//! GET  /cart/count             - Cart badge count
//! GET  /cart/events            - Cart notices (server-sent events)
//! POST /cart/add               - Add or merge a product (HX-Trigger: cart-updated)
//! POST /cart/update            - Overwrite a line's quantity
//! POST /cart/remove            - Remove a line
//!
//! # Checkout (requires auth)
//! POST /checkout               - Simulated payment
//!
//! # Auth
//! POST /auth/register          - Create account and sign in
//! POST /auth/login             - Sign in
//! POST /auth/logout            - Sign out
//!
//! # Wishlist (requires auth)
//! GET    /wishlist             - Wishlist products
//! POST   /wishlist             - Add product
//! DELETE /wishlist/{product_id} - Remove product
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/events", get(cart::events))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index).post(wishlist::add))
        .route("/{product_id}", delete(wishlist::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .route("/categories", get(products::categories))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .nest("/auth", auth_routes())
        .nest("/wishlist", wishlist_routes())
}
