//! Action dispatch against the remote Trello service.
//!
//! The dispatcher validates caller input against the action contract,
//! performs the remote calls through the [`ports::TrelloGateway`] port, and
//! validates the output before returning it. The module follows hexagonal
//! architecture:
//!
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
