//! Single-record access predicate and list visibility scope.

use crate::model::caller::{CallerIdentity, UserId};
use crate::model::waiter::Waiter;

/// Record subset a caller is allowed to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Every record in the table.
    All,
    /// Only records owned by the given user.
    Owner(UserId),
}

/// Returns whether `caller` may read, update or delete `waiter`.
pub fn can_access(caller: &CallerIdentity, waiter: &Waiter) -> bool {
    caller.is_superuser || waiter.owner_id == caller.id
}

/// Returns the list scope for `caller`.
pub fn visibility_scope(caller: &CallerIdentity) -> VisibilityScope {
    if caller.is_superuser {
        VisibilityScope::All
    } else {
        VisibilityScope::Owner(caller.id)
    }
}
