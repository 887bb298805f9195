//! Webhook lifecycle bounded context.
//!
//! Keeps the single remote webhook of the integration consistent with the
//! persisted `webhookState` slot, and authenticates and deduplicates the
//! change events it delivers.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
