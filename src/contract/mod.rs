//! Typed action contracts for the Trello integration.
//!
//! The contract layer declares every supported remote operation together
//! with its input and output schemas. It follows the same hexagonal split
//! as the rest of the crate:
//!
//! - Domain types in [`domain`]
//! - The immutable action registry in [`registry`]

pub mod domain;
pub mod registry;

pub use registry::ActionRegistry;
