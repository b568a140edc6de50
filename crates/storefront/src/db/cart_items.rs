//! Cart line items for signed-in customers.
//!
//! Every statement is scoped by `user_id`. Lines are unique per
//! `(user_id, product_id)`, and quantity changes happen in a single statement
//! on the server so concurrent adds cannot lose an increment.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use shanga_core::{CartLineId, CartLineItem, Product, ProductId, Quantity, UserId};

use super::RepositoryError;
use super::catalog::ProductRow;

/// Joins a `line` relation (table or CTE) with its product and category.
const LINE_SELECT: &str = r"
    SELECT line.id, line.product_id, line.quantity,
           p.name AS product_name, p.description, p.price, p.image_url,
           p.stock, p.featured, c.name AS category_name
    FROM line
    LEFT JOIN storefront.products p ON p.id = line.product_id
    LEFT JOIN storefront.categories c ON c.id = p.category_id
";

/// Row shape of a cart line joined with its product.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    product_id: ProductId,
    quantity: i32,
    product_name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    image_url: Option<String>,
    stock: Option<i32>,
    featured: Option<bool>,
    category_name: Option<String>,
}

impl TryFrom<CartItemRow> for CartLineItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::try_from(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart line {}: {e}", row.id))
        })?;

        let product = match (row.product_name, row.price) {
            (Some(name), Some(price)) => Some(Product::try_from(ProductRow {
                id: row.product_id.clone(),
                name,
                description: row.description,
                price,
                image_url: row.image_url,
                stock: row.stock,
                featured: row.featured.unwrap_or_default(),
                category_name: row.category_name,
            })?),
            _ => None,
        };

        Ok(Self {
            id: Some(CartLineId::new(row.id)),
            product_id: row.product_id,
            quantity,
            product,
        })
    }
}

/// Repository for `storefront.cart_items`.
pub struct CartItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartItemRepository<'a> {
    /// Create a new cart item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All of a user's lines with their products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` for an invalid stored quantity.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn lines(&self, user_id: UserId) -> Result<Vec<CartLineItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            r"
            WITH line AS (
                SELECT id, product_id, quantity, created_at
                FROM storefront.cart_items
                WHERE user_id = $1
            )
            {LINE_SELECT}
            ORDER BY line.created_at, line.id
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLineItem::try_from).collect()
    }

    /// A user's line for one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn find(
        &self,
        user_id: UserId,
        product_id: &ProductId,
    ) -> Result<Option<CartLineItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            r"
            WITH line AS (
                SELECT id, product_id, quantity
                FROM storefront.cart_items
                WHERE user_id = $1 AND product_id = $2
            )
            {LINE_SELECT}
            "
        ))
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(CartLineItem::try_from).transpose()
    }

    /// Create a line. If one appeared for the same product since the caller
    /// looked, the quantities are added instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails (including an
    /// unknown product).
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn insert(
        &self,
        user_id: UserId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<CartLineItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            r"
            WITH line AS (
                INSERT INTO storefront.cart_items (user_id, product_id, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, product_id) DO UPDATE SET
                    quantity = LEAST(
                        cart_items.quantity::BIGINT + EXCLUDED.quantity,
                        2147483647
                    )::INTEGER,
                    updated_at = NOW()
                RETURNING id, product_id, quantity
            )
            {LINE_SELECT}
            "
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(quantity.as_i32())
        .fetch_one(self.pool)
        .await?;

        CartLineItem::try_from(row)
    }

    /// Add `delta` to an existing line. Returns `None` if the line is gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn increment(
        &self,
        user_id: UserId,
        product_id: &ProductId,
        delta: Quantity,
    ) -> Result<Option<CartLineItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            r"
            WITH line AS (
                UPDATE storefront.cart_items
                SET quantity = LEAST(quantity::BIGINT + $3, 2147483647)::INTEGER,
                    updated_at = NOW()
                WHERE user_id = $1 AND product_id = $2
                RETURNING id, product_id, quantity
            )
            {LINE_SELECT}
            "
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(i64::from(delta.get()))
        .fetch_optional(self.pool)
        .await?;

        row.map(CartLineItem::try_from).transpose()
    }

    /// Overwrite a line's quantity. Returns `None` if the line does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<Option<CartLineItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            r"
            WITH line AS (
                UPDATE storefront.cart_items
                SET quantity = $3, updated_at = NOW()
                WHERE user_id = $1 AND product_id = $2
                RETURNING id, product_id, quantity
            )
            {LINE_SELECT}
            "
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(quantity.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(CartLineItem::try_from).transpose()
    }

    /// Remove a user's line for one product. Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn delete(
        &self,
        user_id: UserId,
        product_id: &ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM storefront.cart_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
