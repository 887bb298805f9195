//! Install-time configuration contract.
//!
//! The host supplies an API key, an API token, and optionally the board to
//! watch. Credentials are kept in [`Secret`] so they never reach logs.

mod integration;
mod secret;

pub use integration::{
    API_KEY_ENV, API_KEY_FIELD, API_TOKEN_ENV, API_TOKEN_FIELD, BOARD_ID_ENV, BOARD_ID_FIELD,
    IntegrationConfiguration,
};
pub use secret::Secret;
