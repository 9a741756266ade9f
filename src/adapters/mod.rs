//! Adapters - Implementations of ports for external systems.
//!
//! - `stripe` - Stripe REST API gateway plus an in-memory test double
//! - `http` - Axum routes, handlers, and DTOs for the public API

pub mod http;
pub mod stripe;
