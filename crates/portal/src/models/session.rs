//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use wholesale_core::{BuyerId, PortalRole};

use crate::identity::VerifiedUser;

/// Session-stored buyer identity.
///
/// Minimal data stored in the session to identify the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentBuyer {
    /// Identity service user ID.
    pub id: BuyerId,
    /// Email address at sign-in.
    pub email: String,
    /// Portal role (buyer or staff).
    #[serde(default)]
    pub role: PortalRole,
}

impl CurrentBuyer {
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.role == PortalRole::Staff
    }
}

impl From<VerifiedUser> for CurrentBuyer {
    fn from(user: VerifiedUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in buyer.
    pub const CURRENT_BUYER: &str = "current_buyer";

    /// Key for storing the buyer's cart snapshot.
    pub const CART: &str = "cart";
}
