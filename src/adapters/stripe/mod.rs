//! Stripe adapter - `PaymentGateway` backed by the Stripe REST API.

mod gateway;
mod mock_gateway;
mod types;

pub use gateway::{StripeGateway, StripeGatewayConfig};
pub use mock_gateway::MockGateway;
