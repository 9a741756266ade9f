//! Payments HTTP module: DTOs, handlers, and route wiring.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::PaymentsAppState;
pub use routes::payments_router;
