//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate authorization and repository calls into use-case APIs.
//! - Keep host layers (HTTP, CLI) decoupled from storage details.

pub mod waiter_service;
