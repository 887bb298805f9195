//! Registration, teardown, and event intake for the integration's webhook.

use super::error::{StateConsistencyError, WebhookLifecycleResult};
use crate::configuration::IntegrationConfiguration;
use crate::contract::domain::TrelloId;
use crate::remote::RemoteResult;
use crate::webhook::domain::{
    InboundWebhookEvent, ProcessedEventLedger, RemoteWebhook, WebhookRegistrationState,
};
use crate::webhook::ports::{WebhookRemote, WebhookStateStore, WebhookStateStoreResult};
use chrono::TimeDelta;
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of [`WebhookLifecycleService::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A webhook now watches the configured board.
    Registered(RemoteWebhook),
    /// No board is configured, so no webhook is registered.
    Skipped,
}

/// Result of [`WebhookLifecycleService::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The event is authentic and seen for the first time.
    Accepted,
    /// The event is authentic but was already accepted.
    Duplicate,
}

/// Keeps exactly one remote webhook consistent with the stored state.
///
/// Every transition runs inside one mutual-exclusion region covering
/// "read stored id, deregister, register, persist", so concurrent
/// registrations cannot leave an unreachable remote webhook behind.
pub struct WebhookLifecycleService<S, R, C>
where
    S: WebhookStateStore,
    R: WebhookRemote,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    remote: Arc<R>,
    clock: Arc<C>,
    callback_url: String,
    transition: Mutex<()>,
    ledger: Mutex<ProcessedEventLedger>,
}

impl<S, R, C> WebhookLifecycleService<S, R, C>
where
    S: WebhookStateStore,
    R: WebhookRemote,
    C: Clock + Send + Sync,
{
    /// Creates a lifecycle service delivering events to `callback_url`.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        remote: Arc<R>,
        clock: Arc<C>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            remote,
            clock,
            callback_url: callback_url.into(),
            transition: Mutex::new(()),
            ledger: Mutex::new(ProcessedEventLedger::default()),
        }
    }

    /// Replaces the retention window used to deduplicate events.
    #[must_use]
    pub fn with_event_retention(mut self, retention: TimeDelta) -> Self {
        self.ledger = Mutex::new(ProcessedEventLedger::new(retention));
        self
    }

    /// Returns the URL receiving change events.
    #[must_use]
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Returns the number of change events currently remembered for
    /// deduplication.
    pub async fn processed_events(&self) -> usize {
        self.ledger.lock().await.len()
    }

    /// Returns the stored registration state.
    ///
    /// # Errors
    ///
    /// Returns [`StateConsistencyError::StoreReadFailed`] when the store
    /// cannot be read.
    pub async fn state(&self) -> WebhookLifecycleResult<WebhookRegistrationState> {
        Ok(self
            .store
            .load()
            .await
            .map_err(StateConsistencyError::StoreReadFailed)?)
    }

    /// Registers a webhook watching `board_id`.
    ///
    /// Leaked registrations for this integration's callback URL are deleted
    /// first, then any stored registration is deregistered. The new
    /// identifier is persisted before this call returns.
    ///
    /// # Errors
    ///
    /// Returns [`super::WebhookLifecycleError::Remote`] when a remote call fails,
    /// [`StateConsistencyError::StoreWriteFailed`] when the new registration
    /// could not be persisted (it is deleted remotely again), or
    /// [`StateConsistencyError::LeakedRegistration`] when that deletion also
    /// failed.
    pub async fn register(&self, board_id: &TrelloId) -> WebhookLifecycleResult<RemoteWebhook> {
        let _transition = self.transition.lock().await;
        let current = self.state().await?;
        self.delete_leaked(current.webhook_id()).await?;
        if let Some(stale) = current.webhook_id() {
            self.deregister(stale).await?;
            self.persist(&WebhookRegistrationState::Unregistered).await?;
        }

        let webhook = self
            .remote
            .create_webhook(board_id, &self.callback_url)
            .await?;
        let registered = WebhookRegistrationState::Registered(webhook.id.clone());
        if let Err(source) = self.save_and_reset(&registered).await {
            warn!(
                webhook_id = %webhook.id,
                error = %source,
                "persisting webhook registration failed; deleting remote webhook"
            );
            let failure = match self.deregister(&webhook.id).await {
                Ok(()) => StateConsistencyError::StoreWriteFailed(source),
                Err(cleanup) => StateConsistencyError::LeakedRegistration {
                    webhook_id: webhook.id.clone(),
                    source: Box::new(source),
                    cleanup: Box::new(cleanup),
                },
            };
            return Err(failure.into());
        }

        info!(webhook_id = %webhook.id, board_id = %board_id, "webhook registered");
        Ok(webhook)
    }

    /// Applies the install-time configuration.
    ///
    /// Registers against the configured board. Without a board, a stored
    /// registration is torn down; otherwise the remote service is not
    /// contacted at all.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::register`] or [`Self::uninstall`].
    pub async fn install(
        &self,
        configuration: &IntegrationConfiguration,
    ) -> WebhookLifecycleResult<InstallOutcome> {
        match configuration.webhook_target() {
            Some(board_id) => Ok(InstallOutcome::Registered(self.register(board_id).await?)),
            None => {
                if self.state().await?.is_registered() {
                    self.uninstall().await?;
                }
                info!("no board configured; webhook registration skipped");
                Ok(InstallOutcome::Skipped)
            }
        }
    }

    /// Deletes the stored webhook and any leaked registration.
    ///
    /// Returns the identifier of the stored webhook, if there was one.
    /// Calling this while unregistered is a no-op apart from leak cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`super::WebhookLifecycleError::Remote`] when a remote call fails or
    /// [`StateConsistencyError`] when the store cannot be accessed.
    pub async fn uninstall(&self) -> WebhookLifecycleResult<Option<TrelloId>> {
        let _transition = self.transition.lock().await;
        let current = self.state().await?;
        let removed = current.webhook_id().cloned();
        if let Some(webhook_id) = &removed {
            self.deregister(webhook_id).await?;
            self.persist(&WebhookRegistrationState::Unregistered).await?;
            info!(webhook_id = %webhook_id, "webhook deregistered");
        }
        self.delete_leaked(None).await?;
        Ok(removed)
    }

    /// Handles the remote service reporting `webhook_id` as no longer valid.
    ///
    /// Returns `true` when the stored registration was reset.
    ///
    /// # Errors
    ///
    /// Returns [`StateConsistencyError`] when the store cannot be accessed.
    pub async fn invalidate(&self, webhook_id: &TrelloId) -> WebhookLifecycleResult<bool> {
        let _transition = self.transition.lock().await;
        let current = self.state().await?;
        if !current.is_registered_as(webhook_id) {
            debug!(webhook_id = %webhook_id, state = %current, "ignoring stale invalidation");
            return Ok(false);
        }
        self.persist(&WebhookRegistrationState::Unregistered).await?;
        warn!(webhook_id = %webhook_id, "webhook invalidated by remote service");
        Ok(true)
    }

    /// Checks that `event` was delivered to the registered webhook.
    ///
    /// # Errors
    ///
    /// Returns [`StateConsistencyError::NotRegistered`] or
    /// [`StateConsistencyError::WebhookIdMismatch`] for foreign events, and
    /// [`StateConsistencyError::StoreReadFailed`] when the store cannot be
    /// read.
    pub async fn authenticate(&self, event: &InboundWebhookEvent) -> WebhookLifecycleResult<()> {
        let received = event.webhook_id();
        let rejection = match self.state().await? {
            WebhookRegistrationState::Registered(expected) if expected == *received => {
                return Ok(());
            }
            WebhookRegistrationState::Registered(expected) => {
                StateConsistencyError::WebhookIdMismatch {
                    expected,
                    received: received.clone(),
                }
            }
            WebhookRegistrationState::Unregistered => StateConsistencyError::NotRegistered {
                received: received.clone(),
            },
        };
        warn!(
            webhook_id = %received,
            action_id = %event.action_id(),
            error = %rejection,
            "rejecting webhook event"
        );
        Err(rejection.into())
    }

    /// Authenticates `event` and records it so each change is accepted once.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::authenticate`].
    pub async fn ingest(
        &self,
        event: &InboundWebhookEvent,
    ) -> WebhookLifecycleResult<IngestOutcome> {
        let mut ledger = self.ledger.lock().await;
        self.authenticate(event).await?;
        if ledger.record(event, &*self.clock) {
            debug!(
                action_id = %event.action_id(),
                action_type = event.action_type(),
                "webhook event accepted"
            );
            Ok(IngestOutcome::Accepted)
        } else {
            debug!(action_id = %event.action_id(), "duplicate webhook event");
            Ok(IngestOutcome::Duplicate)
        }
    }

    async fn persist(&self, state: &WebhookRegistrationState) -> WebhookLifecycleResult<()> {
        Ok(self
            .save_and_reset(state)
            .await
            .map_err(StateConsistencyError::StoreWriteFailed)?)
    }

    /// Saves a new registration state and forgets processed events.
    ///
    /// The ledger guard is held across the save, so an in-flight
    /// [`Self::ingest`] either completes against the old state first or
    /// authenticates against the new one.
    async fn save_and_reset(
        &self,
        state: &WebhookRegistrationState,
    ) -> WebhookStateStoreResult<()> {
        let mut ledger = self.ledger.lock().await;
        self.store.save(state).await?;
        ledger.clear();
        Ok(())
    }

    /// Deletes a remote webhook; a registration that is already gone counts
    /// as deleted.
    async fn deregister(&self, webhook_id: &TrelloId) -> RemoteResult<()> {
        match self.remote.delete_webhook(webhook_id).await {
            Err(err) if err.is_not_found() => {
                debug!(webhook_id = %webhook_id, "webhook already gone");
                Ok(())
            }
            other => other,
        }
    }

    /// Deletes registrations for this callback URL other than `keep`.
    async fn delete_leaked(&self, keep: Option<&TrelloId>) -> RemoteResult<usize> {
        let leaked: Vec<RemoteWebhook> = self
            .remote
            .list_webhooks()
            .await?
            .into_iter()
            .filter(|webhook| webhook.targets(&self.callback_url) && Some(&webhook.id) != keep)
            .collect();
        for webhook in &leaked {
            warn!(
                webhook_id = %webhook.id,
                model_id = %webhook.model_id,
                "deleting leaked webhook registration"
            );
            self.deregister(&webhook.id).await?;
        }
        Ok(leaked.len())
    }
}
