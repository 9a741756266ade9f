//! GlowUp Payments - checkout, webhook ingestion, and refund service.
//!
//! This crate fronts a payment provider's hosted checkout: it creates
//! checkout sessions, ingests signed webhook events, propagates payment
//! metadata across related provider objects, and issues refunds.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
