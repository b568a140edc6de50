//! Catalog repository: products and categories.
//!
//! Products reference categories by foreign key. Every read joins the
//! category name in and flattens the row into a [`Product`].

use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use shanga_core::{CategoryId, Price, Product, ProductId};

use super::RepositoryError;

/// Columns selected by every product read.
const PRODUCT_COLUMNS: &str = r"
    p.id, p.name, p.description, p.price, p.image_url, p.stock, p.featured,
    c.name AS category_name
    FROM storefront.products p
    LEFT JOIN storefront.categories c ON c.id = p.category_id
";

/// Row shape of a product joined with its category name.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock: Option<i32>,
    pub featured: bool,
    pub category_name: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;
        let stock = row
            .stock
            .map(u32::try_from)
            .transpose()
            .map_err(|_| {
                RepositoryError::DataCorruption(format!("product {}: negative stock", row.id))
            })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            price,
            image: Self::image_or_placeholder(row.image_url),
            category: Self::category_or_default(row.category_name),
            stock,
            description: row.description,
            featured: row.featured,
        })
    }
}

/// A product to create or overwrite, keyed by name.
#[derive(Debug, Clone)]
pub struct UpsertProduct {
    /// Key used only when the product does not exist yet.
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub stock: Option<u32>,
    pub featured: bool,
    pub category_id: Option<CategoryId>,
}

/// Deduplicate category names, keeping the first occurrence of each.
pub fn dedup_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn rows_to_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All products, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` for negative prices or stock.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} ORDER BY p.name"
        ))
        .fetch_all(self.pool)
        .await?;

        rows_to_products(rows)
    }

    /// A single product, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` for negative prices or stock.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Products flagged as featured, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` for negative prices or stock.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} WHERE p.featured ORDER BY p.name"
        ))
        .fetch_all(self.pool)
        .await?;

        rows_to_products(rows)
    }

    /// Products in the named category. An unknown category yields no products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` for negative prices or stock.
    #[instrument(skip(self))]
    pub async fn products_in_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, RepositoryError> {
        let Some(category_id) = self.category_id_by_name(category).await? else {
            debug!("Unknown category");
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} WHERE p.category_id = $1 ORDER BY p.name"
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        rows_to_products(rows)
    }

    /// Category names, deduplicated. Order is not guaranteed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let names: Vec<(String,)> = sqlx::query_as("SELECT name FROM storefront.categories")
            .fetch_all(self.pool)
            .await?;

        Ok(dedup_names(names.into_iter().map(|(name,)| name)))
    }

    /// Look up a category's id by its name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_id_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CategoryId>, RepositoryError> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM storefront.categories WHERE name = $1")
                .bind(name)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(id,)| CategoryId::new(id)))
    }

    // =========================================================================
    // Writes (catalog management)
    // =========================================================================

    /// Create a category, or update the description of an existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, description))]
    pub async fn insert_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<CategoryId, RepositoryError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r"
            INSERT INTO storefront.categories (name, description)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE
                SET description = COALESCE(EXCLUDED.description, categories.description)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await?;

        Ok(CategoryId::new(id))
    }

    /// Insert a product, or overwrite the product with the same name.
    ///
    /// Returns the key of the stored product, which is the existing key when
    /// the name was already present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn upsert_product(
        &self,
        product: &UpsertProduct,
    ) -> Result<ProductId, RepositoryError> {
        let stock = product
            .stock
            .map(i32::try_from)
            .transpose()
            .map_err(|_| RepositoryError::Conflict("stock out of range".to_owned()))?;

        let (id,): (ProductId,) = sqlx::query_as(
            r"
            INSERT INTO storefront.products
                (id, name, description, price, image_url, stock, featured, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (name) DO UPDATE SET
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                image_url = EXCLUDED.image_url,
                stock = EXCLUDED.stock,
                featured = EXCLUDED.featured,
                category_id = EXCLUDED.category_id,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price.amount())
        .bind(product.image_url.as_deref())
        .bind(stock)
        .bind(product.featured)
        .bind(product.category_id)
        .fetch_one(self.pool)
        .await?;

        debug!(product_id = %id, "Upserted product");
        Ok(id)
    }

    /// Delete every product. Returns the number of rows removed.
    ///
    /// Cart and wishlist rows referencing the products go with them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn delete_all_products(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.products")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shanga_core::{PLACEHOLDER_IMAGE, UNCATEGORIZED};

    fn row() -> ProductRow {
        ProductRow {
            id: ProductId::parse("sisal-basket").unwrap(),
            name: "Sisal Market Basket".to_owned(),
            description: Some("Two-tone sisal market basket".to_owned()),
            price: Decimal::new(4599, 2),
            image_url: None,
            stock: Some(12),
            featured: false,
            category_name: None,
        }
    }

    #[test]
    fn test_row_fallbacks() {
        let product = Product::try_from(row()).unwrap();
        assert_eq!(product.image, PLACEHOLDER_IMAGE);
        assert_eq!(product.category, UNCATEGORIZED);
        assert_eq!(product.stock, Some(12));
        assert_eq!(product.price.to_string(), "$45.99");
    }

    #[test]
    fn test_row_keeps_category_and_image() {
        let product = Product::try_from(ProductRow {
            image_url: Some("/uploads/basket.png".to_owned()),
            category_name: Some("Beaded Accessories".to_owned()),
            ..row()
        })
        .unwrap();
        assert_eq!(product.image, "/uploads/basket.png");
        assert_eq!(product.category, "Beaded Accessories");
    }

    #[test]
    fn test_row_rejects_negative_values() {
        let negative_price = ProductRow {
            price: Decimal::new(-100, 2),
            ..row()
        };
        assert!(matches!(
            Product::try_from(negative_price),
            Err(RepositoryError::DataCorruption(_))
        ));

        let negative_stock = ProductRow {
            stock: Some(-1),
            ..row()
        };
        assert!(matches!(
            Product::try_from(negative_stock),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_dedup_names() {
        let names = ["Jewelry", "Jewelry", "Sandals"].map(String::from);
        let deduped: HashSet<_> = dedup_names(names).into_iter().collect();
        let expected: HashSet<_> = ["Jewelry", "Sandals"].map(String::from).into();
        assert_eq!(deduped, expected);
    }
}
