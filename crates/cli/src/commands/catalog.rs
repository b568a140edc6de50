//! Catalog management commands.

use tracing::info;

use shanga_storefront::db::CatalogRepository;

/// Create a category, or update an existing one's description.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the insert fails.
pub async fn add_category(
    name: &str,
    description: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = name.trim();
    if name.is_empty() {
        return Err("category name cannot be empty".into());
    }

    let pool = super::connect().await?;
    let id = CatalogRepository::new(&pool)
        .insert_category(name, description)
        .await?;

    info!(category_id = %id, name, "Category saved");
    Ok(())
}

/// Delete every product. Cart lines and wishlist entries go with them.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn clear_products() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let removed = CatalogRepository::new(&pool).delete_all_products().await?;

    info!(removed, "Products cleared");
    Ok(())
}
