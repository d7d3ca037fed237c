//! Domain model for the waiter resource.
//!
//! # Responsibility
//! - Define the persisted `Waiter` record and its create/update payloads.
//! - Define the caller identity used by authorization.
//!
//! # Invariants
//! - Every waiter has exactly one `owner_id`, fixed at creation.
//! - Payload types never carry `id` or `owner_id`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod caller;
pub mod waiter;
