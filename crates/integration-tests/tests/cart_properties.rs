//! Cart reconciliation properties.
//!
//! Anonymous carts run on the real session store over an in-memory session
//! backend; signed-in carts run on `MemoryCartStore`. No database needed.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use shanga_core::{OwnerContext, Product, ProductId, Quantity, UserId};
use shanga_integration_tests::{MemoryCartStore, memory_session, product};
use shanga_storefront::db::catalog::dedup_names;
use shanga_storefront::services::cart::{
    CartError, CartEvent, CartEvents, CartService, SessionCartStore,
};
use tower_sessions::Session;

fn anonymous(session: Session, events: &CartEvents) -> CartService {
    CartService::new(
        Box::new(SessionCartStore::new(session, events.clone())),
        events.clone(),
    )
}

fn signed_in(store: &MemoryCartStore, events: &CartEvents) -> CartService {
    CartService::new(Box::new(store.clone()), events.clone())
}

fn qty(n: i64) -> Quantity {
    Quantity::new(n).unwrap()
}

fn sandals() -> Product {
    product("sandal-001", "Maasai Beaded Sandals", 5999, "African Sandals")
}

// ============================================================================
// Merging
// ============================================================================

#[tokio::test]
async fn test_repeated_adds_sum_into_one_line() {
    let events = CartEvents::new();
    let carts = [
        anonymous(memory_session(), &events),
        signed_in(&MemoryCartStore::new(UserId::generate()), &events),
    ];
    let sandals = sandals();
    let deltas = [1, 3, 2, 7, 1];

    for cart in &carts {
        for delta in deltas {
            cart.add_or_increment(&sandals.id, qty(delta), Some(&sandals))
                .await
                .unwrap();
        }

        let lines = cart.lines().await.unwrap();
        assert_eq!(lines.len(), 1, "owner {}", cart.owner());
        assert_eq!(i64::from(lines[0].quantity.get()), deltas.iter().sum::<i64>());
    }
}

#[tokio::test]
async fn test_first_add_creates_single_line_with_delta() {
    let events = CartEvents::new();
    let cart = signed_in(&MemoryCartStore::new(UserId::generate()), &events);
    let necklace = product("jewelry-001", "Coral Beaded Necklace", 7999, "Jewelry");

    let line = cart
        .add_or_increment(&necklace.id, qty(4), None)
        .await
        .unwrap();

    assert_eq!(line.quantity.get(), 4);
    assert!(line.id.is_some());
    assert_eq!(cart.lines().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_merge_keeps_line_identity() {
    let events = CartEvents::new();
    let cart = signed_in(&MemoryCartStore::new(UserId::generate()), &events);
    let sandals = sandals();

    let first = cart
        .add_or_increment(&sandals.id, qty(1), None)
        .await
        .unwrap();
    let second = cart
        .add_or_increment(&sandals.id, qty(1), None)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity.get(), 2);
}

#[tokio::test]
async fn test_sandal_scenario() {
    let events = CartEvents::new();
    let cart = anonymous(memory_session(), &events);
    let sandals = sandals();
    assert!(cart.lines().await.unwrap().is_empty());

    cart.add_or_increment(&sandals.id, Quantity::ONE, Some(&sandals))
        .await
        .unwrap();
    let lines = cart.lines().await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id.as_str(), "sandal-001");
    assert_eq!(lines[0].quantity.get(), 1);

    cart.add_or_increment(&sandals.id, Quantity::ONE, Some(&sandals))
        .await
        .unwrap();
    let lines = cart.lines().await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity.get(), 2);
}

#[tokio::test]
async fn test_anonymous_lines_embed_snapshot() {
    let events = CartEvents::new();
    let cart = anonymous(memory_session(), &events);
    let sandals = sandals();

    cart.add_or_increment(&sandals.id, qty(2), Some(&sandals))
        .await
        .unwrap();

    let summary = cart.summary().await.unwrap();
    assert_eq!(summary.lines[0].product.as_ref(), Some(&sandals));
    assert_eq!(summary.subtotal.to_string(), "$119.98");
}

// ============================================================================
// Remove and set quantity
// ============================================================================

#[tokio::test]
async fn test_remove_then_add_matches_fresh_cart() {
    let events = CartEvents::new();
    let used = anonymous(memory_session(), &events);
    let fresh = anonymous(memory_session(), &events);
    let sandals = sandals();

    used.add_or_increment(&sandals.id, qty(5), Some(&sandals))
        .await
        .unwrap();
    assert!(used.remove_line(&sandals.id).await.unwrap());

    used.add_or_increment(&sandals.id, qty(2), Some(&sandals))
        .await
        .unwrap();
    fresh
        .add_or_increment(&sandals.id, qty(2), Some(&sandals))
        .await
        .unwrap();

    assert_eq!(used.lines().await.unwrap(), fresh.lines().await.unwrap());
}

#[tokio::test]
async fn test_set_quantity_non_positive_is_noop() {
    let events = CartEvents::new();
    let store = MemoryCartStore::new(UserId::generate());
    let cart = signed_in(&store, &events);
    let sandals = sandals();
    cart.add_or_increment(&sandals.id, qty(3), None)
        .await
        .unwrap();
    let before = cart.lines().await.unwrap();
    let mut rx = events.subscribe();

    for requested in [0, -1, i64::MIN] {
        assert!(cart.set_quantity(&sandals.id, requested).await.unwrap().is_none());
    }

    assert_eq!(cart.lines().await.unwrap(), before);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_set_quantity_too_large_is_rejected() {
    let events = CartEvents::new();
    let cart = signed_in(&MemoryCartStore::new(UserId::generate()), &events);
    let sandals = sandals();
    cart.add_or_increment(&sandals.id, qty(1), None)
        .await
        .unwrap();

    let err = cart
        .set_quantity(&sandals.id, i64::from(i32::MAX) + 1)
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::InvalidQuantity(_)));
    assert_eq!(cart.lines().await.unwrap()[0].quantity.get(), 1);
}

// ============================================================================
// Owner switching
// ============================================================================

#[tokio::test]
async fn test_sign_in_does_not_transfer_lines() {
    let events = CartEvents::new();
    let session = memory_session();
    let user = UserId::generate();
    let remote = MemoryCartStore::new(user);
    let sandals = sandals();
    let earrings = product("jewelry-002", "Zulu Beaded Earrings", 3499, "Jewelry");

    // The customer already had something in their remote cart.
    signed_in(&remote, &events)
        .add_or_increment(&earrings.id, qty(1), None)
        .await
        .unwrap();

    let owner = OwnerContext::Anonymous;
    anonymous(session.clone(), &events)
        .add_or_increment(&sandals.id, qty(2), Some(&sandals))
        .await
        .unwrap();

    let owner = owner.sign_in(user);
    assert_eq!(owner, OwnerContext::Authenticated(user));
    let remote_lines = signed_in(&remote, &events).lines().await.unwrap();
    let ids: Vec<&ProductId> = remote_lines.iter().map(|l| &l.product_id).collect();
    assert_eq!(ids, vec![&earrings.id]);

    // Signing out returns to the untouched anonymous cart.
    assert!(owner.sign_out().is_anonymous());
    let local_lines = anonymous(session, &events).lines().await.unwrap();
    assert_eq!(local_lines.len(), 1);
    assert_eq!(local_lines[0].product_id, sandals.id);
    assert_eq!(local_lines[0].quantity.get(), 2);
}

// ============================================================================
// Failures and notifications
// ============================================================================

#[tokio::test]
async fn test_store_failure_surfaces_without_notice() {
    let events = CartEvents::new();
    let store = MemoryCartStore::new(UserId::generate());
    let cart = signed_in(&store, &events);
    let mut rx = events.subscribe();

    store.fail();
    let err = cart
        .add_or_increment(&sandals().id, qty(1), None)
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::Store(_)));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_notices_are_tagged_with_owner() {
    let events = CartEvents::new();
    let user = UserId::generate();
    let cart = signed_in(&MemoryCartStore::new(user), &events);
    let mut rx = events.subscribe();

    cart.add_or_increment(&sandals().id, qty(1), None)
        .await
        .unwrap();

    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.event, CartEvent::CartUpdated);
    assert!(notice.concerns(OwnerContext::Authenticated(user)));
    assert!(!notice.concerns(OwnerContext::Anonymous));
    assert!(!notice.concerns(OwnerContext::Authenticated(UserId::generate())));
}

// ============================================================================
// Catalog
// ============================================================================

#[test]
fn test_categories_deduplicate() {
    let names = dedup_names(["Jewelry", "Jewelry", "Sandals"].map(String::from));

    let set: HashSet<_> = names.iter().map(String::as_str).collect();
    assert_eq!(names.len(), 2);
    assert_eq!(set, HashSet::from(["Jewelry", "Sandals"]));
}
