//! Cart ownership.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Who owns the cart being read or written.
///
/// An anonymous owner's cart lives in their browser session; an
/// authenticated owner's cart lives in the database. Switching between the
/// two never moves line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum OwnerContext {
    #[default]
    Anonymous,
    Authenticated(UserId),
}

impl OwnerContext {
    /// Build from an optional signed-in user.
    #[must_use]
    pub const fn from_user(user: Option<UserId>) -> Self {
        match user {
            Some(id) => Self::Authenticated(id),
            None => Self::Anonymous,
        }
    }

    /// Transition after a successful sign-in.
    #[must_use]
    pub const fn sign_in(self, user: UserId) -> Self {
        Self::Authenticated(user)
    }

    /// Transition after sign-out or session expiry.
    #[must_use]
    pub const fn sign_out(self) -> Self {
        Self::Anonymous
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(*id),
        }
    }
}

impl fmt::Display for OwnerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::Authenticated(id) => write!(f, "user:{id}"),
        }
    }
}
