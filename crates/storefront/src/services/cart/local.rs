//! Anonymous carts, kept in the visitor's session.
//!
//! The whole cart is one ordered list of line items under the session key
//! [`keys::CART`]. Each line embeds a product snapshot so the cart renders
//! without a catalog query.

use async_trait::async_trait;
use tower_sessions::Session;
use tracing::warn;

use shanga_core::{CartLineItem, NewCartLine, OwnerContext, ProductId, Quantity};

use super::events::{CartEvent, CartEvents};
use super::store::{CartStore, CartStoreError};
use crate::models::keys;

/// Cart store for visitors who are not signed in.
pub struct SessionCartStore {
    session: Session,
    events: CartEvents,
}

impl SessionCartStore {
    #[must_use]
    pub const fn new(session: Session, events: CartEvents) -> Self {
        Self { session, events }
    }

    /// Load the slot. Missing or malformed data reads as an empty cart.
    async fn load(&self) -> Result<Vec<CartLineItem>, CartStoreError> {
        let Some(raw) = self.session.get_value(keys::CART).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_value(raw) {
            Ok(lines) => Ok(lines),
            Err(e) => {
                warn!(error = %e, "Discarding malformed session cart");
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the slot, persist it, then announce the change.
    ///
    /// Listeners re-read the cart from another request, so the record must be
    /// in the backing store before the notice goes out.
    async fn save(&self, lines: &[CartLineItem]) -> Result<(), CartStoreError> {
        self.session.insert(keys::CART, lines).await?;
        self.session.save().await?;
        self.events
            .publish(OwnerContext::Anonymous, CartEvent::StorageChanged);
        Ok(())
    }
}

#[async_trait]
impl CartStore for SessionCartStore {
    fn owner(&self) -> OwnerContext {
        OwnerContext::Anonymous
    }

    async fn lines(&self) -> Result<Vec<CartLineItem>, CartStoreError> {
        self.load().await
    }

    async fn find(&self, product_id: &ProductId) -> Result<Option<CartLineItem>, CartStoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|line| &line.product_id == product_id))
    }

    async fn insert(&self, line: NewCartLine) -> Result<CartLineItem, CartStoreError> {
        let mut lines = self.load().await?;

        // A line may have been added by a concurrent request; merge into it.
        let stored = if let Some(existing) = lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            existing.clone()
        } else {
            let new_line = CartLineItem {
                id: None,
                product_id: line.product_id,
                quantity: line.quantity,
                product: line.snapshot,
            };
            lines.push(new_line.clone());
            new_line
        };

        self.save(&lines).await?;
        Ok(stored)
    }

    async fn increment(
        &self,
        product_id: &ProductId,
        delta: Quantity,
    ) -> Result<Option<CartLineItem>, CartStoreError> {
        let mut lines = self.load().await?;
        let Some(line) = lines.iter_mut().find(|l| &l.product_id == product_id) else {
            return Ok(None);
        };
        line.quantity = line.quantity.saturating_add(delta);
        let updated = line.clone();

        self.save(&lines).await?;
        Ok(Some(updated))
    }

    async fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<Option<CartLineItem>, CartStoreError> {
        let mut lines = self.load().await?;
        let Some(line) = lines.iter_mut().find(|l| &l.product_id == product_id) else {
            return Ok(None);
        };
        line.quantity = quantity;
        let updated = line.clone();

        self.save(&lines).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, product_id: &ProductId) -> Result<bool, CartStoreError> {
        let mut lines = self.load().await?;
        let before = lines.len();
        lines.retain(|l| &l.product_id != product_id);
        if lines.len() == before {
            return Ok(false);
        }

        self.save(&lines).await?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, SessionStore};

    use super::*;
    use shanga_core::{PLACEHOLDER_IMAGE, Price, Product};

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn snapshot(id: &str) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: "Geometric Beaded Sandals".to_owned(),
            price: Price::from_cents(7499).unwrap(),
            image: PLACEHOLDER_IMAGE.to_owned(),
            category: "African Sandals".to_owned(),
            stock: Some(18),
            description: None,
            featured: true,
        }
    }

    fn new_line(id: &str, qty: i64) -> NewCartLine {
        NewCartLine {
            product_id: ProductId::parse(id).unwrap(),
            quantity: Quantity::new(qty).unwrap(),
            snapshot: Some(snapshot(id)),
        }
    }

    #[tokio::test]
    async fn test_empty_session_reads_empty() {
        let store = SessionCartStore::new(session(), CartEvents::new());
        assert!(store.lines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_slot_reads_empty() {
        let session = session();
        session
            .insert(keys::CART, serde_json::json!({"not": "a list"}))
            .await
            .unwrap();
        let store = SessionCartStore::new(session, CartEvents::new());
        assert!(store.lines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_in_slot_is_malformed() {
        let session = session();
        session
            .insert(
                keys::CART,
                serde_json::json!([{ "product_id": "sandal-001", "quantity": 0 }]),
            )
            .await
            .unwrap();
        let store = SessionCartStore::new(session, CartEvents::new());
        assert!(store.lines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_keeps_snapshot_and_order() {
        let store = SessionCartStore::new(session(), CartEvents::new());
        store.insert(new_line("sandal-001", 1)).await.unwrap();
        store.insert(new_line("necklace-7", 3)).await.unwrap();

        let lines = store.lines().await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id.as_str(), "sandal-001");
        assert!(lines[0].product.is_some());
        assert!(lines[0].id.is_none());
        assert_eq!(lines[1].quantity.get(), 3);
    }

    #[tokio::test]
    async fn test_write_publishes_storage_changed() {
        let events = CartEvents::new();
        let mut rx = events.subscribe();
        let store = SessionCartStore::new(session(), events);

        store.insert(new_line("sandal-001", 1)).await.unwrap();

        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.event, CartEvent::StorageChanged);
        assert_eq!(notice.owner, OwnerContext::Anonymous);
    }

    #[tokio::test]
    async fn test_cart_is_persisted_before_notice() {
        let backing = Arc::new(MemoryStore::default());
        let session = Session::new(None, backing.clone(), None);
        let events = CartEvents::new();
        let mut rx = events.subscribe();
        let store = SessionCartStore::new(session.clone(), events);

        store.insert(new_line("sandal-001", 2)).await.unwrap();
        rx.recv().await.unwrap();

        let id = session.id().expect("saving assigns a session id");
        let record = backing.load(&id).await.unwrap().expect("record was saved");
        let saved: Vec<CartLineItem> =
            serde_json::from_value(record.data[keys::CART].clone()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_line_writes_nothing() {
        let events = CartEvents::new();
        let mut rx = events.subscribe();
        let store = SessionCartStore::new(session(), events);

        let removed = store
            .delete(&ProductId::parse("ghost").unwrap())
            .await
            .unwrap();
        assert!(!removed);
        assert!(rx.try_recv().is_err());
    }
}
