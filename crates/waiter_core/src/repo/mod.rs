//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence contract the waiter service depends on.
//! - Isolate SQLite query details from authorization and orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Repositories never make authorization decisions.

pub mod waiter_repo;
