//! Error types for webhook lifecycle transitions.

use crate::contract::domain::TrelloId;
use crate::remote::RemoteServiceError;
use crate::webhook::ports::WebhookStateStoreError;
use thiserror::Error;

/// The stored registration and the remote service disagree, or the store
/// failed during a transition.
///
/// A failed transition leaves the stored state as it was before the
/// transition started.
#[derive(Debug, Clone, Error)]
pub enum StateConsistencyError {
    /// An event was addressed to a webhook other than the registered one.
    #[error("event for webhook {received} does not match registered webhook {expected}")]
    WebhookIdMismatch {
        /// Registered webhook identifier.
        expected: TrelloId,
        /// Webhook identifier carried by the event.
        received: TrelloId,
    },

    /// An event arrived while no webhook is registered.
    #[error("event for webhook {received} arrived while no webhook is registered")]
    NotRegistered {
        /// Webhook identifier carried by the event.
        received: TrelloId,
    },

    /// The stored state could not be read.
    #[error("failed to read webhook state: {0}")]
    StoreReadFailed(#[source] WebhookStateStoreError),

    /// The new state could not be persisted.
    #[error("failed to persist webhook state: {0}")]
    StoreWriteFailed(#[source] WebhookStateStoreError),

    /// A webhook was registered remotely but could neither be persisted nor
    /// deleted. It is removed by the next registration.
    #[error("webhook {webhook_id} was registered but not persisted and could not be deleted")]
    LeakedRegistration {
        /// Identifier of the leaked registration.
        webhook_id: TrelloId,
        /// Store failure that prevented persisting the registration.
        #[source]
        source: Box<WebhookStateStoreError>,
        /// Remote failure that prevented deleting the registration.
        cleanup: Box<RemoteServiceError>,
    },
}

/// Errors returned by [`super::WebhookLifecycleService`].
#[derive(Debug, Clone, Error)]
pub enum WebhookLifecycleError {
    /// A remote webhook call failed.
    #[error(transparent)]
    Remote(#[from] RemoteServiceError),
    /// Stored state is inconsistent or could not be accessed.
    #[error(transparent)]
    State(#[from] StateConsistencyError),
}

impl WebhookLifecycleError {
    /// Returns whether repeating the transition may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Remote(err) => err.is_transient(),
            Self::State(_) => false,
        }
    }
}

/// Result type for webhook lifecycle operations.
pub type WebhookLifecycleResult<T> = Result<T, WebhookLifecycleError>;
