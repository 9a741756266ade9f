//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ChargeStore` - Reads and metadata writes for payment objects
//! - `PaymentGateway` - Full provider surface: checkout, refunds, lookups

mod charge_store;
mod payment_gateway;

pub use charge_store::{ChargeStore, GatewayError, GatewayErrorCode};
pub use payment_gateway::{CreateCheckoutSessionRequest, CreateRefundRequest, PaymentGateway};
