//! Persistence port for the `webhookState` slot.

use crate::contract::domain::ValidationError;
use crate::webhook::domain::WebhookRegistrationState;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for webhook state store operations.
pub type WebhookStateStoreResult<T> = Result<T, WebhookStateStoreError>;

/// Durable storage for the integration-scoped registration state.
///
/// A slot that has never been written loads as
/// [`WebhookRegistrationState::Unregistered`].
#[async_trait]
pub trait WebhookStateStore: Send + Sync {
    /// Loads the stored registration state.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookStateStoreError::InvalidPersistedData`] when the
    /// stored document does not match the slot schema, or
    /// [`WebhookStateStoreError::Persistence`] when the backend fails.
    async fn load(&self) -> WebhookStateStoreResult<WebhookRegistrationState>;

    /// Replaces the stored registration state.
    ///
    /// A failed save leaves the previously stored state in place.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookStateStoreError::Persistence`] when the backend
    /// fails.
    async fn save(&self, state: &WebhookRegistrationState) -> WebhookStateStoreResult<()>;
}

/// Errors returned by webhook state store implementations.
#[derive(Debug, Clone, Error)]
pub enum WebhookStateStoreError {
    /// The stored document does not match the slot schema.
    #[error("stored webhook state is invalid: {0}")]
    InvalidPersistedData(#[source] ValidationError),

    /// The storage backend failed.
    #[error("webhook state persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WebhookStateStoreError {
    /// Wraps a storage backend error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<ValidationError> for WebhookStateStoreError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidPersistedData(err)
    }
}
