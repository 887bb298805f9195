//! Shared world state for webhook lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use trello_integration::contract::domain::TrelloId;
use trello_integration::webhook::{
    adapters::{InMemoryWebhookRemote, InMemoryWebhookStateStore},
    domain::RemoteWebhook,
    services::{IngestOutcome, InstallOutcome, WebhookLifecycleResult, WebhookLifecycleService},
};

/// Callback URL registered by the scenarios.
pub const CALLBACK_URL: &str = "https://hooks.example.test/trello";

/// Service type used by the BDD world.
pub type TestWebhookService =
    WebhookLifecycleService<InMemoryWebhookStateStore, InMemoryWebhookRemote, DefaultClock>;

/// Scenario world for webhook lifecycle behaviour tests.
pub struct WebhookWorld {
    pub store: Arc<InMemoryWebhookStateStore>,
    pub remote: Arc<InMemoryWebhookRemote>,
    pub service: TestWebhookService,
    pub registrations: Vec<RemoteWebhook>,
    pub last_install: Option<WebhookLifecycleResult<InstallOutcome>>,
    pub event_results: Vec<WebhookLifecycleResult<IngestOutcome>>,
}

impl WebhookWorld {
    /// Creates a world with an unregistered integration.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryWebhookStateStore::new());
        let remote = Arc::new(InMemoryWebhookRemote::new());
        let service = WebhookLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&remote),
            Arc::new(DefaultClock),
            CALLBACK_URL,
        );
        Self {
            store,
            remote,
            service,
            registrations: Vec::new(),
            last_install: None,
            event_results: Vec::new(),
        }
    }

    /// Registers against `board_id` and remembers the new webhook.
    pub fn register(&mut self, board_id: &str) -> Result<(), eyre::Report> {
        let board = TrelloId::new(board_id)?;
        let webhook = run_async(self.service.register(&board))?;
        self.registrations.push(webhook);
        Ok(())
    }
}

impl Default for WebhookWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WebhookWorld {
    WebhookWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
