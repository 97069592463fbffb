//! Request-scoped values of the lead-plan flow.

pub mod intake;
pub mod webhook;

pub use intake::{ChannelsUsed, Intake};
pub use webhook::{WebhookPayload, WEBHOOK_TAGS};
