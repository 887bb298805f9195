//! Webhook lifecycle flows against the file-backed state slot.

use super::helpers::CALLBACK_URL;
use camino::Utf8Path;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use trello_integration::configuration::{IntegrationConfiguration, Secret};
use trello_integration::contract::domain::TrelloId;
use trello_integration::webhook::adapters::{FileWebhookStateStore, InMemoryWebhookRemote};
use trello_integration::webhook::domain::{InboundWebhookEvent, WebhookRegistrationState};
use trello_integration::webhook::services::{
    IngestOutcome, InstallOutcome, WebhookLifecycleError, WebhookLifecycleService,
};

type FileBackedService =
    WebhookLifecycleService<FileWebhookStateStore, InMemoryWebhookRemote, DefaultClock>;

const BOARD_ID: &str = "5f1e2d3c4b5a69788796a5b4";

struct Installation {
    directory: TempDir,
    remote: Arc<InMemoryWebhookRemote>,
}

impl Installation {
    /// Builds a service over the shared directory, as a fresh process would.
    fn start(&self) -> FileBackedService {
        let path = Utf8Path::from_path(self.directory.path()).expect("temp dir is UTF-8");
        let store = FileWebhookStateStore::open(path).expect("state directory opens");
        WebhookLifecycleService::new(
            Arc::new(store),
            Arc::clone(&self.remote),
            Arc::new(DefaultClock),
            CALLBACK_URL,
        )
    }
}

#[fixture]
fn installation() -> Installation {
    Installation {
        directory: TempDir::new().expect("temp dir"),
        remote: Arc::new(InMemoryWebhookRemote::new()),
    }
}

fn board() -> TrelloId {
    TrelloId::new(BOARD_ID).expect("valid board id")
}

fn configuration(board_id: Option<TrelloId>) -> IntegrationConfiguration {
    IntegrationConfiguration::new(Secret::new("key"), Secret::new("token"), board_id)
}

fn event(webhook_id: &TrelloId, action_id: &str) -> InboundWebhookEvent {
    InboundWebhookEvent::from_payload(
        webhook_id.clone(),
        &json!({
            "action": { "id": action_id, "type": "updateCard" },
            "model": { "id": BOARD_ID }
        }),
    )
    .expect("well-formed event")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registration_survives_restart(installation: Installation) {
    let webhook = installation
        .start()
        .register(&board())
        .await
        .expect("registration should succeed");

    let restarted = installation.start();

    assert_eq!(
        restarted.state().await.expect("state loads"),
        WebhookRegistrationState::Registered(webhook.id.clone())
    );
    assert_eq!(
        restarted
            .ingest(&event(&webhook.id, "6a1b2c3d4e5f60718293a4b5"))
            .await
            .expect("event accepted"),
        IngestOutcome::Accepted
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reinstall_after_restart_keeps_one_live_webhook(installation: Installation) {
    let first = installation
        .start()
        .install(&configuration(Some(board())))
        .await
        .expect("first install should succeed");
    let second = installation
        .start()
        .install(&configuration(Some(board())))
        .await
        .expect("second install should succeed");

    let (InstallOutcome::Registered(first), InstallOutcome::Registered(second)) =
        (first, second)
    else {
        panic!("both installs should register");
    };
    let live = installation.remote.live_webhooks().expect("remote readable");
    assert_ne!(first.id, second.id);
    assert_eq!(live, vec![second]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn old_webhook_events_are_rejected_after_reinstall(installation: Installation) {
    let service = installation.start();
    let old = service.register(&board()).await.expect("first registration");
    service.register(&board()).await.expect("second registration");

    let error = service
        .ingest(&event(&old.id, "6a1b2c3d4e5f60718293a4b5"))
        .await
        .expect_err("events for the replaced webhook must be rejected");

    assert!(matches!(error, WebhookLifecycleError::State(_)), "{error}");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn uninstall_clears_remote_and_slot(installation: Installation) {
    let webhook = installation
        .start()
        .register(&board())
        .await
        .expect("registration should succeed");

    let removed = installation.start().uninstall().await.expect("uninstall should succeed");

    assert_eq!(removed, Some(webhook.id));
    assert!(installation.remote.live_webhooks().expect("remote readable").is_empty());
    assert_eq!(
        installation.start().state().await.expect("state loads"),
        WebhookRegistrationState::Unregistered
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn install_without_board_leaves_nothing_behind(installation: Installation) {
    let outcome = installation
        .start()
        .install(&configuration(None))
        .await
        .expect("install should succeed");

    assert_eq!(outcome, InstallOutcome::Skipped);
    assert!(installation.remote.live_webhooks().expect("remote readable").is_empty());
    assert!(!installation.directory.path().join("webhookState.json").exists());
}
