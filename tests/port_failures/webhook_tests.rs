//! Registration behaviour when the remote service or the store fails.

use super::mocks::{MockRemote, MockStore, id};
use mockall::{Sequence, predicate::eq};
use mockable::DefaultClock;
use std::io;
use std::sync::Arc;
use trello_integration::configuration::{IntegrationConfiguration, Secret};
use trello_integration::remote::{RemoteFailureKind, RemoteServiceError};
use trello_integration::webhook::domain::{RemoteWebhook, WebhookRegistrationState};
use trello_integration::webhook::ports::WebhookStateStoreError;
use trello_integration::webhook::services::{
    InstallOutcome, StateConsistencyError, WebhookLifecycleError, WebhookLifecycleService,
};

const CALLBACK_URL: &str = "https://hooks.example.test/trello";
const BOARD_ID: &str = "5f1e2d3c4b5a69788796a5b4";
const WEBHOOK_ID: &str = "6a1b2c3d4e5f60718293a4b5";

fn service(
    store: MockStore,
    remote: MockRemote,
) -> WebhookLifecycleService<MockStore, MockRemote, DefaultClock> {
    WebhookLifecycleService::new(
        Arc::new(store),
        Arc::new(remote),
        Arc::new(DefaultClock),
        CALLBACK_URL,
    )
}

fn created_webhook() -> RemoteWebhook {
    RemoteWebhook {
        id: id(WEBHOOK_ID),
        model_id: id(BOARD_ID),
        callback_url: CALLBACK_URL.to_owned(),
        active: true,
    }
}

fn disk_full() -> WebhookStateStoreError {
    WebhookStateStoreError::persistence(io::Error::other("disk full"))
}

#[tokio::test]
async fn failed_persist_deletes_exactly_the_new_webhook() {
    let mut sequence = Sequence::new();
    let mut store = MockStore::new();
    let mut remote = MockRemote::new();
    store
        .expect_load()
        .times(1)
        .returning(|| Ok(WebhookRegistrationState::Unregistered));
    remote
        .expect_list_webhooks()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(Vec::new()));
    remote
        .expect_create_webhook()
        .withf(|model_id, callback_url| *model_id == id(BOARD_ID) && callback_url == CALLBACK_URL)
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(created_webhook()));
    store
        .expect_save()
        .with(eq(WebhookRegistrationState::Registered(id(WEBHOOK_ID))))
        .times(1)
        .returning(|_| Err(disk_full()));
    remote
        .expect_delete_webhook()
        .with(eq(id(WEBHOOK_ID)))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));

    let error = service(store, remote)
        .register(&id(BOARD_ID))
        .await
        .expect_err("registration must fail when the slot cannot be written");

    assert!(matches!(
        error,
        WebhookLifecycleError::State(StateConsistencyError::StoreWriteFailed(_))
    ));
}

#[tokio::test]
async fn transient_listing_failure_never_creates_a_webhook() {
    let mut store = MockStore::new();
    let mut remote = MockRemote::new();
    store
        .expect_load()
        .times(1)
        .returning(|| Ok(WebhookRegistrationState::Unregistered));
    remote.expect_list_webhooks().times(1).returning(|| {
        Err(RemoteServiceError::new(
            "list_webhooks",
            RemoteFailureKind::Unavailable,
            "maintenance",
        ))
    });
    remote.expect_create_webhook().never();
    store.expect_save().never();

    let error = service(store, remote)
        .register(&id(BOARD_ID))
        .await
        .expect_err("registration must fail");

    assert!(error.is_retryable());
}

#[tokio::test]
async fn stale_registration_is_removed_before_creating_a_new_one() {
    let stale = id("7a1b2c3d4e5f60718293a4b5");
    let mut sequence = Sequence::new();
    let mut store = MockStore::new();
    let mut remote = MockRemote::new();
    let stored = stale.clone();
    store
        .expect_load()
        .times(1)
        .returning(move || Ok(WebhookRegistrationState::Registered(stored.clone())));
    remote
        .expect_list_webhooks()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(Vec::new()));
    remote
        .expect_delete_webhook()
        .with(eq(stale))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));
    store
        .expect_save()
        .with(eq(WebhookRegistrationState::Unregistered))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));
    remote
        .expect_create_webhook()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(created_webhook()));
    store
        .expect_save()
        .with(eq(WebhookRegistrationState::Registered(id(WEBHOOK_ID))))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));

    let webhook = service(store, remote)
        .register(&id(BOARD_ID))
        .await
        .expect("registration should succeed");

    assert_eq!(webhook, created_webhook());
}

#[tokio::test]
async fn boardless_install_on_fresh_store_skips_the_remote_entirely() {
    let mut store = MockStore::new();
    let mut remote = MockRemote::new();
    store
        .expect_load()
        .times(1)
        .returning(|| Ok(WebhookRegistrationState::Unregistered));
    store.expect_save().never();
    remote.expect_list_webhooks().never().returning(|| {
        Err(RemoteServiceError::new(
            "list_webhooks",
            RemoteFailureKind::Network,
            "offline",
        ))
    });
    remote.expect_create_webhook().never();
    remote.expect_delete_webhook().never();
    let configuration =
        IntegrationConfiguration::new(Secret::new("key"), Secret::new("token"), None);

    let outcome = service(store, remote)
        .install(&configuration)
        .await
        .expect("install without a board should not need the remote service");

    assert_eq!(outcome, InstallOutcome::Skipped);
}
