//! Seed the catalog from a YAML file.
//!
//! Without `--file` the catalog bundled with the CLI (`seed/catalog.yaml`) is
//! used. Seeding is idempotent: categories and products are upserted by name.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use shanga_core::{Price, ProductId};
use shanga_storefront::db::CatalogRepository;
use shanga_storefront::db::catalog::UpsertProduct;

/// Catalog bundled with the CLI.
pub const DEFAULT_CATALOG: &str = include_str!("../../seed/catalog.yaml");

/// Top-level seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub category: Option<String>,
    pub stock: Option<u32>,
    #[serde(default)]
    pub featured: bool,
    pub description: Option<String>,
}

impl CatalogSeed {
    /// Every category name the seed needs, declared or only referenced.
    fn category_names(&self) -> BTreeSet<&str> {
        self.categories
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.products.iter().filter_map(|p| p.category.as_deref()))
            .collect()
    }
}

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub cleared: u64,
    pub categories: usize,
    pub products: usize,
}

/// Check a parsed seed for problems the database would reject or silently merge.
#[must_use]
pub fn validate(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();
    let mut names = HashSet::new();

    for category in &seed.categories {
        if category.name.trim().is_empty() {
            errors.push("category with an empty name".to_string());
        }
    }

    for product in &seed.products {
        if product.name.trim().is_empty() {
            errors.push(format!("product {} has an empty name", product.id));
        }
        if !ids.insert(product.id.as_str()) {
            errors.push(format!("duplicate product id {}", product.id));
        }
        if !names.insert(product.name.as_str()) {
            errors.push(format!("duplicate product name {:?}", product.name));
        }
        if product.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            errors.push(format!("product {} has an empty category", product.id));
        }
    }

    errors
}

/// Parse and validate seed YAML.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or fails validation.
pub fn parse(content: &str) -> Result<CatalogSeed, Box<dyn std::error::Error>> {
    let seed: CatalogSeed = serde_yaml::from_str(content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    Ok(seed)
}

/// Write a validated seed to the database.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub async fn apply(
    pool: &PgPool,
    seed: &CatalogSeed,
    clear_existing: bool,
) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let repo = CatalogRepository::new(pool);
    let mut summary = SeedSummary::default();

    if clear_existing {
        summary.cleared = repo.delete_all_products().await?;
        info!(removed = summary.cleared, "Cleared existing products");
    }

    for name in seed.category_names() {
        let description = seed
            .categories
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.description.as_deref());
        repo.insert_category(name, description).await?;
        summary.categories += 1;
    }

    for product in &seed.products {
        let category_id = match product.category.as_deref() {
            Some(name) => repo.category_id_by_name(name).await?,
            None => None,
        };

        repo.upsert_product(&UpsertProduct {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image_url: product.image.clone(),
            stock: product.stock,
            featured: product.featured,
            category_id,
        })
        .await?;
        summary.products += 1;
    }

    Ok(summary)
}

/// Seed the catalog from `file_path`, or from the bundled catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or the
/// database rejects it.
pub async fn catalog(
    file_path: Option<&str>,
    clear_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = match file_path {
        Some(file_path) => {
            let path = Path::new(file_path);
            if !path.exists() {
                return Err(format!("File not found: {file_path}").into());
            }
            info!(path = %file_path, "Loading catalog from file");
            tokio::fs::read_to_string(path).await?
        }
        None => {
            info!("Loading bundled catalog");
            DEFAULT_CATALOG.to_owned()
        }
    };

    // Validate before connecting to the database
    let seed = parse(&content)?;
    info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Parsed catalog"
    );

    let pool = super::connect().await?;
    let summary = apply(&pool, &seed, clear_existing).await?;

    info!("Seeding complete!");
    info!("  Products cleared: {}", summary.cleared);
    info!("  Categories upserted: {}", summary.categories);
    info!("  Products upserted: {}", summary.products);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_is_valid() {
        let seed = parse(DEFAULT_CATALOG).unwrap();
        assert_eq!(seed.products.len(), 8);

        let sandals = seed
            .products
            .iter()
            .find(|p| p.id.as_str() == "sandal-001")
            .unwrap();
        assert_eq!(sandals.price, Price::from_cents(5999).unwrap());
        assert!(sandals.featured);
    }

    #[test]
    fn test_category_names_are_deduplicated() {
        let seed = parse(DEFAULT_CATALOG).unwrap();
        let names: Vec<_> = seed.category_names().into_iter().collect();
        assert_eq!(
            names,
            vec!["African Sandals", "Ankara Fabric", "Beaded Accessories", "Jewelry"]
        );
    }

    #[test]
    fn test_referenced_category_is_included() {
        let seed = parse(
            r#"
products:
  - id: basket-1
    name: Sisal Basket
    price: "40.00"
    category: Home
"#,
        )
        .unwrap();
        assert!(seed.category_names().contains("Home"));
        assert!(seed.products[0].image.is_none());
    }

    #[test]
    fn test_duplicates_rejected() {
        let seed: CatalogSeed = serde_yaml::from_str(
            r#"
products:
  - id: a
    name: Same
    price: "1.00"
  - id: a
    name: Same
    price: "2.00"
"#,
        )
        .unwrap();
        let errors = validate(&seed);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = parse(
            r#"
products:
  - id: a
    name: Refund
    price: "-1.00"
"#,
        );
        assert!(result.is_err());
    }
}
