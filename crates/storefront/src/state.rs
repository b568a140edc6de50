//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tower_sessions::Session;

use shanga_core::OwnerContext;

use crate::config::StorefrontConfig;
use crate::services::cart::{CartEvents, CartService, select_store};
use crate::services::catalog::CatalogService;
use crate::services::checkout::CheckoutService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: CatalogService,
    cart_events: CartEvents,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = CatalogService::new(pool.clone(), config.catalog_cache_ttl);
        let checkout = CheckoutService::new(config.checkout_delay);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                cart_events: CartEvents::new(),
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cached catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the cart notification bus.
    #[must_use]
    pub fn cart_events(&self) -> &CartEvents {
        &self.inner.cart_events
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    /// Cart operations for `owner`, backed by the store that owns their cart.
    #[must_use]
    pub fn cart(&self, owner: OwnerContext, session: Session) -> CartService {
        let events = self.inner.cart_events.clone();
        let store = select_store(owner, session, self.inner.pool.clone(), events.clone());
        CartService::new(store, events)
    }
}
