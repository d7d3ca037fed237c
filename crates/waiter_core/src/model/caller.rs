//! Authenticated caller identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an authenticated user. Also used as waiter `owner_id`.
pub type UserId = Uuid;

/// The principal making a request, as resolved by the host's auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: UserId,
    /// Superusers bypass per-record ownership checks.
    pub is_superuser: bool,
}

impl CallerIdentity {
    /// Regular user scoped to their own records.
    pub fn user(id: UserId) -> Self {
        Self {
            id,
            is_superuser: false,
        }
    }

    pub fn superuser(id: UserId) -> Self {
        Self {
            id,
            is_superuser: true,
        }
    }
}
