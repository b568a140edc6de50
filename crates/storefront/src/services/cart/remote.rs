//! Signed-in carts, kept in `storefront.cart_items`.

use async_trait::async_trait;
use sqlx::PgPool;

use shanga_core::{CartLineItem, NewCartLine, OwnerContext, ProductId, Quantity, UserId};

use super::store::{CartStore, CartStoreError};
use crate::db::CartItemRepository;

/// Cart store bound to one signed-in customer.
///
/// Lines carry only the product reference; the product is joined in when the
/// lines are read back.
pub struct PgCartStore {
    pool: PgPool,
    user_id: UserId,
}

impl PgCartStore {
    #[must_use]
    pub const fn new(pool: PgPool, user_id: UserId) -> Self {
        Self { pool, user_id }
    }

    const fn repo(&self) -> CartItemRepository<'_> {
        CartItemRepository::new(&self.pool)
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    fn owner(&self) -> OwnerContext {
        OwnerContext::Authenticated(self.user_id)
    }

    async fn lines(&self) -> Result<Vec<CartLineItem>, CartStoreError> {
        Ok(self.repo().lines(self.user_id).await?)
    }

    async fn find(&self, product_id: &ProductId) -> Result<Option<CartLineItem>, CartStoreError> {
        Ok(self.repo().find(self.user_id, product_id).await?)
    }

    async fn insert(&self, line: NewCartLine) -> Result<CartLineItem, CartStoreError> {
        Ok(self
            .repo()
            .insert(self.user_id, &line.product_id, line.quantity)
            .await?)
    }

    async fn increment(
        &self,
        product_id: &ProductId,
        delta: Quantity,
    ) -> Result<Option<CartLineItem>, CartStoreError> {
        Ok(self.repo().increment(self.user_id, product_id, delta).await?)
    }

    async fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<Option<CartLineItem>, CartStoreError> {
        Ok(self
            .repo()
            .set_quantity(self.user_id, product_id, quantity)
            .await?)
    }

    async fn delete(&self, product_id: &ProductId) -> Result<bool, CartStoreError> {
        Ok(self.repo().delete(self.user_id, product_id).await?)
    }
}
