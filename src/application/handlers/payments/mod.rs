//! Payment use cases: checkout creation, refunds, session verification,
//! and webhook processing.

mod create_checkout_session;
mod get_refund_history;
mod issue_refund;
mod process_webhook;
mod verify_session;

pub use create_checkout_session::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
};
pub use get_refund_history::{
    GetRefundHistoryCommand, GetRefundHistoryHandler, GetRefundHistoryResult,
};
pub use issue_refund::{IssueRefundCommand, IssueRefundHandler, IssueRefundResult};
pub use process_webhook::ProcessWebhookHandler;
pub use verify_session::{VerifySessionCommand, VerifySessionHandler};
