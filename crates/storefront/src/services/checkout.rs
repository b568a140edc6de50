//! Simulated checkout.
//!
//! No payment provider is involved: the payment step waits for a configured
//! delay and then succeeds. The cart is left as it was.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use shanga_core::{CartSummary, PaymentStatus, Price};

/// Errors that can occur during checkout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to pay for.
    #[error("cart is empty")]
    EmptyCart,
}

/// Proof of a completed (simulated) payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    /// Short human-readable reference, e.g. `SH-3F9A1C27B0D4`.
    pub reference: String,
    pub status: PaymentStatus,
    pub amount: Price,
    /// Number of line items paid for.
    pub item_count: usize,
    pub paid_at: DateTime<Utc>,
}

/// Runs the simulated payment step.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutService {
    delay: Duration,
}

impl CheckoutService {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Pay for `cart`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    #[instrument(skip(self, cart), fields(lines = cart.line_count, amount = %cart.total))]
    pub async fn pay(&self, cart: &CartSummary) -> Result<PaymentReceipt, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        tokio::time::sleep(self.delay).await;

        let receipt = PaymentReceipt {
            reference: payment_reference(),
            status: PaymentStatus::Succeeded,
            amount: cart.total,
            item_count: cart.line_count,
            paid_at: Utc::now(),
        };

        info!(reference = %receipt.reference, "Payment simulated");
        Ok(receipt)
    }
}

fn payment_reference() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("SH-{}", id.chars().take(12).collect::<String>())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shanga_core::{CartLineItem, Product, ProductId, Quantity};

    fn cart() -> CartSummary {
        let product = Product {
            id: ProductId::parse("bracelets").unwrap(),
            name: "Maasai Beaded Bracelets Set".to_owned(),
            price: Price::from_cents(4999).unwrap(),
            image: shanga_core::PLACEHOLDER_IMAGE.to_owned(),
            category: "Beaded Accessories".to_owned(),
            stock: Some(30),
            description: None,
            featured: true,
        };
        CartSummary::from_lines(vec![CartLineItem {
            id: None,
            product_id: product.id.clone(),
            quantity: Quantity::new(2).unwrap(),
            product: Some(product),
        }])
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let checkout = CheckoutService::new(Duration::ZERO);
        let result = checkout.pay(&CartSummary::from_lines(Vec::new())).await;
        assert_eq!(result.unwrap_err(), CheckoutError::EmptyCart);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_then_succeeds() {
        let checkout = CheckoutService::new(Duration::from_millis(2000));
        let started = tokio::time::Instant::now();

        let receipt = checkout.pay(&cart()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert_eq!(receipt.status, PaymentStatus::Succeeded);
        assert_eq!(receipt.amount, Price::from_cents(9998).unwrap());
        assert_eq!(receipt.item_count, 1);
        assert!(receipt.reference.starts_with("SH-"));
        assert_eq!(receipt.reference.len(), 15);
    }
}
