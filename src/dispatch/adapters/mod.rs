//! Adapter implementations for the remote gateway port.

pub mod memory;

pub use memory::{GatewayOperation, InMemoryTrelloGateway};
