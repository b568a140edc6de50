//! The cart storage capability and its errors.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;

use shanga_core::{CartLineItem, NewCartLine, OwnerContext, ProductId, Quantity};

use super::events::CartEvents;
use super::local::SessionCartStore;
use super::remote::PgCartStore;
use crate::db::RepositoryError;

/// Failures of the storage layer underneath a cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The session backend could not load or save the anonymous cart.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The database rejected or failed a cart statement.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Line item storage for exactly one cart owner.
///
/// Implementations look lines up by product, since a cart holds at most one
/// line per product.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The owner this store is bound to.
    fn owner(&self) -> OwnerContext;

    /// Every line, in insertion order.
    async fn lines(&self) -> Result<Vec<CartLineItem>, CartStoreError>;

    /// The line for `product_id`, if present.
    async fn find(&self, product_id: &ProductId) -> Result<Option<CartLineItem>, CartStoreError>;

    /// Persist a new line and return it as stored.
    async fn insert(&self, line: NewCartLine) -> Result<CartLineItem, CartStoreError>;

    /// Add `delta` to an existing line in place. `None` if there is no line.
    async fn increment(
        &self,
        product_id: &ProductId,
        delta: Quantity,
    ) -> Result<Option<CartLineItem>, CartStoreError>;

    /// Overwrite an existing line's quantity. `None` if there is no line.
    async fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<Option<CartLineItem>, CartStoreError>;

    /// Remove the line for `product_id`. Returns whether one existed.
    async fn delete(&self, product_id: &ProductId) -> Result<bool, CartStoreError>;
}

/// Pick the authoritative store for `owner`.
///
/// Anonymous carts live in the session; signed-in carts live in the database.
#[must_use]
pub fn select_store(
    owner: OwnerContext,
    session: Session,
    pool: PgPool,
    events: CartEvents,
) -> Box<dyn CartStore> {
    match owner {
        OwnerContext::Anonymous => Box::new(SessionCartStore::new(session, events)),
        OwnerContext::Authenticated(user_id) => Box::new(PgCartStore::new(pool, user_id)),
    }
}
