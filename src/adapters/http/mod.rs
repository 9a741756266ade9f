//! HTTP adapter - Axum routes and handlers for the public API.

pub mod payments;
