//! Status enums.

use serde::{Deserialize, Serialize};

/// Outcome of a checkout payment.
///
/// The storefront's payment step is simulated and always succeeds, but the
/// receipt still carries a status so clients do not have to assume it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The payment went through.
    #[default]
    Succeeded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
        }
    }
}
