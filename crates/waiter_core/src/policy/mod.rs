//! Ownership-based authorization rules.
//!
//! # Responsibility
//! - Decide whether a caller may observe or mutate a single waiter.
//! - Derive the visible record set for list queries.
//!
//! # Invariants
//! - Superusers see and mutate every record.
//! - Everyone else is limited to records whose `owner_id` equals their id.

pub mod ownership;
