//! Shanga CLI - Database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations (including the session table)
//! shanga-cli migrate
//!
//! # Seed the bundled catalog, or one from a file
//! shanga-cli seed catalog
//! shanga-cli seed catalog --file catalog.yaml --clear
//!
//! # Manage the catalog
//! shanga-cli catalog add-category "Ankara Fabric" -d "Wax print fabric"
//! shanga-cli catalog clear-products
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shanga-cli")]
#[command(author, version, about = "Shanga CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert categories and products from YAML
    Catalog {
        /// Seed file (defaults to the bundled catalog)
        #[arg(short, long)]
        file: Option<String>,

        /// Delete all products first
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Create a category
    AddCategory {
        /// Category name
        name: String,

        /// Category description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete every product
    ClearProducts,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, clear } => {
                commands::seed::catalog(file.as_deref(), clear).await?;
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::AddCategory { name, description } => {
                commands::catalog::add_category(&name, description.as_deref()).await?;
            }
            CatalogAction::ClearProducts => commands::catalog::clear_products().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_with_file() {
        let cli = Cli::try_parse_from(["shanga-cli", "seed", "catalog", "-f", "x.yaml", "--clear"])
            .map_err(|e| e.to_string());
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Seed {
                    target: SeedTarget::Catalog { file: Some(_), clear: true }
                }
            })
        ));
    }
}
