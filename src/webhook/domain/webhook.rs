//! Webhook registrations as reported by the remote service.

use crate::contract::domain::TrelloId;

/// A webhook registration held by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteWebhook {
    /// Remote identifier of the registration.
    pub id: TrelloId,
    /// Identifier of the watched model (the board).
    pub model_id: TrelloId,
    /// URL receiving change events.
    pub callback_url: String,
    /// Whether the remote service is delivering events.
    pub active: bool,
}

impl RemoteWebhook {
    /// Returns whether the registration delivers to `callback_url`.
    #[must_use]
    pub fn targets(&self, callback_url: &str) -> bool {
        self.callback_url == callback_url
    }
}
