//! Trello integration core.
//!
//! This crate is the contract and synchronisation layer of a Trello
//! connector. It declares and validates typed board, list, card, and member
//! actions, dispatches them through a remote-service port, and keeps the
//! integration's single webhook registration consistent with the remote
//! service so inbound change events are ingested exactly once.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure contracts and state with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the remote service and storage
//! - **Adapters**: In-memory and file-backed implementations of ports
//!
//! # Modules
//!
//! - [`contract`]: Identifier and entity schemas, fragments, and the action
//!   registry
//! - [`configuration`]: Install-time credentials and board selection
//! - [`dispatch`]: Validated action dispatch against the remote service
//! - [`webhook`]: Webhook registration lifecycle and event intake
//! - [`remote`]: Failure taxonomy shared by remote-service ports

pub mod configuration;
pub mod contract;
pub mod dispatch;
pub mod remote;
pub mod webhook;
