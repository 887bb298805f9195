//! Port contracts for webhook state persistence and remote registration.

mod remote;
mod state_store;

pub use remote::WebhookRemote;
pub use state_store::{WebhookStateStore, WebhookStateStoreError, WebhookStateStoreResult};
