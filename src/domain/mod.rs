//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `payment` - Payment metadata, provider objects, webhook verification,
//!   and the event ingestion pipeline

pub mod payment;
