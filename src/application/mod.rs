//! Application layer - Use case orchestration.

pub mod handlers;
