//! In-memory webhook state store and remote for tests and local flows.

use crate::contract::domain::TrelloId;
use crate::remote::{RemoteFailureKind, RemoteResult, RemoteServiceError, mint_remote_id};
use crate::webhook::domain::{RemoteWebhook, WebhookRegistrationState};
use crate::webhook::ports::{
    WebhookRemote, WebhookStateStore, WebhookStateStoreError, WebhookStateStoreResult,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

/// Thread-safe in-memory `webhookState` slot.
///
/// The slot holds the raw persisted document so corrupted data can be
/// seeded, and upcoming loads or saves can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWebhookStateStore {
    state: Arc<RwLock<SlotState>>,
}

#[derive(Debug, Default)]
struct SlotState {
    document: Option<Value>,
    saves: usize,
    load_failures: VecDeque<WebhookStateStoreError>,
    save_failures: VecDeque<WebhookStateStoreError>,
}

impl InMemoryWebhookStateStore {
    /// Creates a store whose slot has never been written.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose slot holds `document` verbatim.
    #[must_use]
    pub fn with_document(document: Value) -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.state.write() {
            state.document = Some(document);
        }
        store
    }

    fn lock(&self) -> WebhookStateStoreResult<RwLockWriteGuard<'_, SlotState>> {
        self.state.write().map_err(|err| {
            WebhookStateStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    /// Returns the raw persisted document, if the slot was ever written.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn document(&self) -> WebhookStateStoreResult<Option<Value>> {
        Ok(self.lock()?.document.clone())
    }

    /// Returns the number of successful saves.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn save_count(&self) -> WebhookStateStoreResult<usize> {
        Ok(self.lock()?.saves)
    }

    /// Makes the next load fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn fail_next_load(&self, error: WebhookStateStoreError) -> WebhookStateStoreResult<()> {
        self.lock()?.load_failures.push_back(error);
        Ok(())
    }

    /// Makes the next save fail with `error`, leaving the slot untouched.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn fail_next_save(&self, error: WebhookStateStoreError) -> WebhookStateStoreResult<()> {
        self.lock()?.save_failures.push_back(error);
        Ok(())
    }
}

#[async_trait]
impl WebhookStateStore for InMemoryWebhookStateStore {
    async fn load(&self) -> WebhookStateStoreResult<WebhookRegistrationState> {
        let mut state = self.lock()?;
        if let Some(error) = state.load_failures.pop_front() {
            return Err(error);
        }
        match &state.document {
            None => Ok(WebhookRegistrationState::Unregistered),
            Some(document) => Ok(WebhookRegistrationState::from_document(document)?),
        }
    }

    async fn save(&self, registration: &WebhookRegistrationState) -> WebhookStateStoreResult<()> {
        let mut state = self.lock()?;
        if let Some(error) = state.save_failures.pop_front() {
            return Err(error);
        }
        state.document = Some(registration.to_document());
        state.saves = state.saves.saturating_add(1);
        Ok(())
    }
}

/// Webhook remote operation names used for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookOperation {
    /// [`WebhookRemote::create_webhook`]
    Create,
    /// [`WebhookRemote::delete_webhook`]
    Delete,
    /// [`WebhookRemote::list_webhooks`]
    List,
}

impl WebhookOperation {
    /// Returns the operation name reported in remote errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create_webhook",
            Self::Delete => "delete_webhook",
            Self::List => "list_webhooks",
        }
    }
}

/// Thread-safe in-memory model of the remote webhook registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWebhookRemote {
    state: Arc<RwLock<RemoteState>>,
}

#[derive(Debug, Default)]
struct RemoteState {
    webhooks: Vec<RemoteWebhook>,
    failures: HashMap<WebhookOperation, VecDeque<RemoteServiceError>>,
    calls: Vec<WebhookOperation>,
}

impl InMemoryWebhookRemote {
    /// Creates a remote with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, operation: WebhookOperation) -> RemoteResult<RwLockWriteGuard<'_, RemoteState>> {
        self.state
            .write()
            .map_err(|err| RemoteServiceError::internal(operation.as_str(), &err))
    }

    /// Opens a call: journals it and consumes any injected failure.
    fn begin(
        &self,
        operation: WebhookOperation,
    ) -> RemoteResult<RwLockWriteGuard<'_, RemoteState>> {
        let mut state = self.lock(operation)?;
        state.calls.push(operation);
        if let Some(error) = state
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        Ok(state)
    }

    /// Makes the next call of `operation` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn fail_next(
        &self,
        operation: WebhookOperation,
        error: RemoteServiceError,
    ) -> RemoteResult<()> {
        let mut state = self.lock(operation)?;
        state.failures.entry(operation).or_default().push_back(error);
        Ok(())
    }

    /// Makes the next call of `operation` fail with a failure of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn fail_next_with(
        &self,
        operation: WebhookOperation,
        kind: RemoteFailureKind,
    ) -> RemoteResult<()> {
        self.fail_next(
            operation,
            RemoteServiceError::new(operation.as_str(), kind, "injected failure"),
        )
    }

    /// Registers a webhook without going through the port.
    ///
    /// Used to model registrations left behind by an earlier process.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn seed_webhook(
        &self,
        model_id: &TrelloId,
        callback_url: &str,
    ) -> RemoteResult<RemoteWebhook> {
        let operation = WebhookOperation::Create;
        let mut state = self.lock(operation)?;
        let webhook = new_webhook(operation, model_id, callback_url)?;
        state.webhooks.push(webhook.clone());
        Ok(webhook)
    }

    /// Returns every live registration.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn live_webhooks(&self) -> RemoteResult<Vec<RemoteWebhook>> {
        Ok(self.lock(WebhookOperation::List)?.webhooks.clone())
    }

    /// Returns every port call attempted so far, in order.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn calls(&self) -> RemoteResult<Vec<WebhookOperation>> {
        Ok(self.lock(WebhookOperation::List)?.calls.clone())
    }
}

fn new_webhook(
    operation: WebhookOperation,
    model_id: &TrelloId,
    callback_url: &str,
) -> RemoteResult<RemoteWebhook> {
    Ok(RemoteWebhook {
        id: mint_remote_id(operation.as_str())?,
        model_id: model_id.clone(),
        callback_url: callback_url.to_owned(),
        active: true,
    })
}

#[async_trait]
impl WebhookRemote for InMemoryWebhookRemote {
    async fn create_webhook(
        &self,
        model_id: &TrelloId,
        callback_url: &str,
    ) -> RemoteResult<RemoteWebhook> {
        let operation = WebhookOperation::Create;
        let mut state = self.begin(operation)?;
        let webhook = new_webhook(operation, model_id, callback_url)?;
        state.webhooks.push(webhook.clone());
        Ok(webhook)
    }

    async fn delete_webhook(&self, webhook_id: &TrelloId) -> RemoteResult<()> {
        let operation = WebhookOperation::Delete;
        let mut state = self.begin(operation)?;
        let before = state.webhooks.len();
        state.webhooks.retain(|webhook| webhook.id != *webhook_id);
        if state.webhooks.len() == before {
            return Err(RemoteServiceError::not_found(
                operation.as_str(),
                format!("webhook {webhook_id} does not exist"),
            ));
        }
        Ok(())
    }

    async fn list_webhooks(&self) -> RemoteResult<Vec<RemoteWebhook>> {
        Ok(self.begin(WebhookOperation::List)?.webhooks.clone())
    }
}
