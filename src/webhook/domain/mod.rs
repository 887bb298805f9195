//! Domain model for the integration's webhook registration.
//!
//! The integration owns at most one remote webhook. Its identifier is the
//! only mutable state the connector persists.

mod event;
mod ledger;
mod state;
mod webhook;

pub use event::InboundWebhookEvent;
pub use ledger::ProcessedEventLedger;
pub use state::{WEBHOOK_STATE_SLOT, WebhookRegistrationState};
pub use webhook::RemoteWebhook;
