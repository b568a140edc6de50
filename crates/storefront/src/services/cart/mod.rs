//! Cart reconciliation.
//!
//! Adding a product merges it into the line that already holds that product,
//! or starts a new line. Which storage holds the cart depends on the owner:
//! the session for anonymous visitors, the database for signed-in customers.
//! Signing in or out never moves lines between the two.

mod events;
mod local;
mod remote;
mod store;

pub use events::{CartEvent, CartEvents, CartNotice};
pub use local::SessionCartStore;
pub use remote::PgCartStore;
pub use store::{CartStore, CartStoreError, select_store};

use thiserror::Error;
use tracing::{debug, instrument};

use shanga_core::{
    CartLineItem, CartSummary, NewCartLine, OwnerContext, Product, ProductId, Quantity,
    QuantityError,
};

/// Errors from cart operations.
///
/// Precondition failures are raised before any storage is touched.
#[derive(Debug, Error)]
pub enum CartError {
    /// Anonymous carts must embed the product they hold.
    #[error("a product snapshot is required for anonymous carts")]
    MissingSnapshot,

    /// The snapshot describes a different product than the one being added.
    #[error("snapshot is for product {got}, expected {expected}")]
    SnapshotMismatch {
        /// Product being added.
        expected: ProductId,
        /// Product the snapshot describes.
        got: ProductId,
    },

    /// The requested quantity cannot be stored.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The storage layer failed; nothing was retried.
    #[error("cart storage failed: {0}")]
    Store(#[from] CartStoreError),
}

/// Cart operations for one owner.
pub struct CartService {
    store: Box<dyn CartStore>,
    events: CartEvents,
}

impl CartService {
    /// Create a service over an already selected store.
    #[must_use]
    pub fn new(store: Box<dyn CartStore>, events: CartEvents) -> Self {
        Self { store, events }
    }

    /// The owner whose cart this is.
    #[must_use]
    pub fn owner(&self) -> OwnerContext {
        self.store.owner()
    }

    /// Add `delta` units of a product, merging into an existing line.
    ///
    /// Anonymous owners must pass the product's `snapshot` so the line can be
    /// displayed without a catalog query. Signed-in owners may pass it; it is
    /// not stored.
    ///
    /// Returns the persisted line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingSnapshot` or `CartError::SnapshotMismatch`
    /// before any I/O if the snapshot preconditions fail.
    /// Returns `CartError::Store` if the storage layer fails.
    #[instrument(skip(self, snapshot), fields(owner = %self.owner(), product_id = %product_id, delta = %delta))]
    pub async fn add_or_increment(
        &self,
        product_id: &ProductId,
        delta: Quantity,
        snapshot: Option<&Product>,
    ) -> Result<CartLineItem, CartError> {
        let anonymous = self.owner().is_anonymous();

        match snapshot {
            None if anonymous => return Err(CartError::MissingSnapshot),
            Some(product) if &product.id != product_id => {
                return Err(CartError::SnapshotMismatch {
                    expected: product_id.clone(),
                    got: product.id.clone(),
                });
            }
            _ => {}
        }

        let existing = self.store.find(product_id).await?;

        let merged = if existing.is_some() {
            debug!("Merging into existing line");
            self.store.increment(product_id, delta).await?
        } else {
            None
        };

        let line = match merged {
            Some(line) => line,
            None => {
                debug!("Creating new line");
                self.store
                    .insert(NewCartLine {
                        product_id: product_id.clone(),
                        quantity: delta,
                        snapshot: if anonymous { snapshot.cloned() } else { None },
                    })
                    .await?
            }
        };

        self.events.publish(self.owner(), CartEvent::CartUpdated);
        Ok(line)
    }

    /// Overwrite a line's quantity.
    ///
    /// A `requested` quantity below 1 is a no-op: nothing is read, written or
    /// announced, and `None` is returned. A product that is not in the cart
    /// also returns `None`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `requested` exceeds the storable
    /// maximum. Returns `CartError::Store` if the storage layer fails.
    #[instrument(skip(self), fields(owner = %self.owner(), product_id = %product_id))]
    pub async fn set_quantity(
        &self,
        product_id: &ProductId,
        requested: i64,
    ) -> Result<Option<CartLineItem>, CartError> {
        if requested < 1 {
            debug!(requested, "Ignoring non-positive quantity");
            return Ok(None);
        }
        let quantity = Quantity::new(requested)?;

        let updated = self.store.set_quantity(product_id, quantity).await?;
        if updated.is_some() {
            self.events.publish(self.owner(), CartEvent::CartUpdated);
        }
        Ok(updated)
    }

    /// Remove a product's line. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the storage layer fails.
    #[instrument(skip(self), fields(owner = %self.owner(), product_id = %product_id))]
    pub async fn remove_line(&self, product_id: &ProductId) -> Result<bool, CartError> {
        let removed = self.store.delete(product_id).await?;
        if removed {
            self.events.publish(self.owner(), CartEvent::CartUpdated);
        }
        Ok(removed)
    }

    /// Every line in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the storage layer fails.
    pub async fn lines(&self) -> Result<Vec<CartLineItem>, CartError> {
        Ok(self.store.lines().await?)
    }

    /// The cart with its totals.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the storage layer fails.
    pub async fn summary(&self) -> Result<CartSummary, CartError> {
        Ok(CartSummary::from_lines(self.lines().await?))
    }

    /// Number of line items, as shown on the cart badge.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the storage layer fails.
    pub async fn count(&self) -> Result<usize, CartError> {
        Ok(self.lines().await?.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use super::*;
    use shanga_core::{PLACEHOLDER_IMAGE, Price};

    fn anonymous_service() -> (CartService, CartEvents) {
        let events = CartEvents::new();
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let store = Box::new(SessionCartStore::new(session, events.clone()));
        (CartService::new(store, events.clone()), events)
    }

    fn id(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn snapshot(s: &str) -> Product {
        Product {
            id: id(s),
            name: "Tribal Beaded Necklace".to_owned(),
            price: Price::from_cents(5999).unwrap(),
            image: PLACEHOLDER_IMAGE.to_owned(),
            category: "Jewelry".to_owned(),
            stock: Some(15),
            description: None,
            featured: true,
        }
    }

    #[tokio::test]
    async fn test_anonymous_add_twice_merges() {
        let (cart, _) = anonymous_service();
        let sandal = snapshot("sandal-001");

        cart.add_or_increment(&sandal.id, qty(1), Some(&sandal))
            .await
            .unwrap();
        let line = cart
            .add_or_increment(&sandal.id, qty(1), Some(&sandal))
            .await
            .unwrap();

        assert_eq!(line.quantity.get(), 2);
        let lines = cart.lines().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id.as_str(), "sandal-001");
        assert_eq!(lines[0].quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_anonymous_requires_snapshot() {
        let (cart, events) = anonymous_service();
        let mut rx = events.subscribe();

        let err = cart
            .add_or_increment(&id("sandal-001"), qty(1), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::MissingSnapshot));
        assert!(cart.lines().await.unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_snapshot_must_match() {
        let (cart, _) = anonymous_service();
        let other = snapshot("necklace-7");

        let err = cart
            .add_or_increment(&id("sandal-001"), qty(1), Some(&other))
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::SnapshotMismatch { .. }));
        assert!(cart.lines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_below_one_is_noop() {
        let (cart, events) = anonymous_service();
        let sandal = snapshot("sandal-001");
        cart.add_or_increment(&sandal.id, qty(3), Some(&sandal))
            .await
            .unwrap();
        let mut rx = events.subscribe();

        assert!(cart.set_quantity(&sandal.id, 0).await.unwrap().is_none());
        assert!(cart.set_quantity(&sandal.id, -2).await.unwrap().is_none());

        assert_eq!(cart.lines().await.unwrap()[0].quantity.get(), 3);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_set_quantity_overwrites() {
        let (cart, _) = anonymous_service();
        let sandal = snapshot("sandal-001");
        cart.add_or_increment(&sandal.id, qty(3), Some(&sandal))
            .await
            .unwrap();

        let line = cart.set_quantity(&sandal.id, 7).await.unwrap().unwrap();
        assert_eq!(line.quantity.get(), 7);
        assert!(cart.set_quantity(&id("ghost"), 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mutations_publish_cart_updated() {
        let (cart, events) = anonymous_service();
        let mut rx = events.subscribe();
        let sandal = snapshot("sandal-001");

        cart.add_or_increment(&sandal.id, qty(1), Some(&sandal))
            .await
            .unwrap();

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|n| n.event)
            .collect();
        assert_eq!(kinds, vec![CartEvent::StorageChanged, CartEvent::CartUpdated]);
    }

    #[tokio::test]
    async fn test_remove_then_add_starts_fresh() {
        let (cart, _) = anonymous_service();
        let sandal = snapshot("sandal-001");
        cart.add_or_increment(&sandal.id, qty(4), Some(&sandal))
            .await
            .unwrap();

        assert!(cart.remove_line(&sandal.id).await.unwrap());
        assert!(!cart.remove_line(&sandal.id).await.unwrap());

        let line = cart
            .add_or_increment(&sandal.id, qty(1), Some(&sandal))
            .await
            .unwrap();
        assert_eq!(line.quantity.get(), 1);
        assert_eq!(cart.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_summary_uses_snapshots() {
        let (cart, _) = anonymous_service();
        let necklace = snapshot("necklace-7");
        cart.add_or_increment(&necklace.id, qty(2), Some(&necklace))
            .await
            .unwrap();

        let summary = cart.summary().await.unwrap();
        assert_eq!(summary.line_count, 1);
        assert_eq!(summary.subtotal, Price::from_cents(11998).unwrap());
    }
}
