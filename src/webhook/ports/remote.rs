//! Remote-call port for webhook registrations.

use crate::contract::domain::TrelloId;
use crate::remote::RemoteResult;
use crate::webhook::domain::RemoteWebhook;
use async_trait::async_trait;

/// Webhook registration calls against the remote service.
#[async_trait]
pub trait WebhookRemote: Send + Sync {
    /// Registers a webhook watching `model_id` and delivering to
    /// `callback_url`.
    async fn create_webhook(
        &self,
        model_id: &TrelloId,
        callback_url: &str,
    ) -> RemoteResult<RemoteWebhook>;

    /// Deletes a webhook registration.
    ///
    /// # Errors
    ///
    /// Returns a not-found [`crate::remote::RemoteServiceError`] when the
    /// registration no longer exists.
    async fn delete_webhook(&self, webhook_id: &TrelloId) -> RemoteResult<()>;

    /// Lists every webhook registered with the integration's credentials.
    async fn list_webhooks(&self) -> RemoteResult<Vec<RemoteWebhook>>;
}
