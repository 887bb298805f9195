//! Adapter implementations for webhook state and remote registration.

pub mod file;
pub mod memory;

pub use file::FileWebhookStateStore;
pub use memory::{InMemoryWebhookRemote, InMemoryWebhookStateStore, WebhookOperation};
