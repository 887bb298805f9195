//! Step definitions for webhook lifecycle scenarios.

mod given;
mod then;
mod when;
pub mod world;
