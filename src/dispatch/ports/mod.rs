//! Port contracts for action dispatch.
//!
//! Ports define infrastructure-agnostic interfaces to the remote Trello
//! service.

pub mod gateway;

pub use gateway::{CardFieldChanges, NewCard, TrelloGateway};
