//! Cart change notifications.
//!
//! A process-wide broadcast channel. Publishing never blocks and never fails;
//! with no subscribers the notice is dropped. Notices carry no cart data,
//! subscribers re-read the cart when they receive one.

use serde::Serialize;
use tokio::sync::broadcast;

use shanga_core::OwnerContext;

/// Buffered notices per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Kind of cart change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartEvent {
    /// The anonymous cart's persisted slot was rewritten.
    StorageChanged,
    /// A cart mutation completed.
    CartUpdated,
}

impl CartEvent {
    /// Event name used on the wire (SSE `event:` field, `HX-Trigger`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StorageChanged => "storage",
            Self::CartUpdated => "cart-updated",
        }
    }
}

/// A notice on the bus: which kind of change, and whose cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartNotice {
    pub owner: OwnerContext,
    pub event: CartEvent,
}

impl CartNotice {
    /// Whether a subscriber acting as `owner` should react.
    ///
    /// Anonymous carts cannot be told apart across sessions, so anonymous
    /// subscribers hear every anonymous change.
    #[must_use]
    pub fn concerns(&self, owner: OwnerContext) -> bool {
        self.owner == owner
    }
}

/// Handle to the cart notification bus. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CartEvents {
    sender: broadcast::Sender<CartNotice>,
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl CartEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Fire-and-forget publish.
    pub fn publish(&self, owner: OwnerContext, event: CartEvent) {
        let receivers = self.sender.send(CartNotice { owner, event }).unwrap_or(0);
        tracing::trace!(event = event.name(), %owner, receivers, "Cart notice published");
    }

    /// Subscribe to notices published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartNotice> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shanga_core::UserId;

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        CartEvents::new().publish(OwnerContext::Anonymous, CartEvent::CartUpdated);
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let events = CartEvents::new();
        let mut rx = events.subscribe();

        events.publish(OwnerContext::Anonymous, CartEvent::StorageChanged);
        events.publish(OwnerContext::Anonymous, CartEvent::CartUpdated);

        assert_eq!(rx.recv().await.unwrap().event, CartEvent::StorageChanged);
        assert_eq!(rx.recv().await.unwrap().event, CartEvent::CartUpdated);
    }

    #[test]
    fn test_notice_scoping() {
        let alice = OwnerContext::Authenticated(UserId::generate());
        let bob = OwnerContext::Authenticated(UserId::generate());
        let notice = CartNotice {
            owner: alice,
            event: CartEvent::CartUpdated,
        };
        assert!(notice.concerns(alice));
        assert!(!notice.concerns(bob));
        assert!(!notice.concerns(OwnerContext::Anonymous));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(CartEvent::CartUpdated.name(), "cart-updated");
        assert_eq!(CartEvent::StorageChanged.name(), "storage");
    }
}
