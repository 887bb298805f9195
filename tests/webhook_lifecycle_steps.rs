//! Behaviour tests for webhook registration and event intake.

#[path = "webhook_lifecycle_steps/mod.rs"]
mod webhook_lifecycle_steps;

use rstest_bdd_macros::scenario;
use webhook_lifecycle_steps::world::{WebhookWorld, world};

#[scenario(
    path = "tests/features/webhook_lifecycle.feature",
    name = "Registering twice keeps a single live webhook"
)]
#[tokio::test(flavor = "multi_thread")]
async fn registering_twice_keeps_one_webhook(world: WebhookWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/webhook_lifecycle.feature",
    name = "Leaked registrations are removed on registration"
)]
#[tokio::test(flavor = "multi_thread")]
async fn leaked_registrations_are_removed(world: WebhookWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/webhook_lifecycle.feature",
    name = "Installing without a board skips registration"
)]
#[tokio::test(flavor = "multi_thread")]
async fn install_without_board_skips(world: WebhookWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/webhook_lifecycle.feature",
    name = "Events for a replaced webhook are rejected"
)]
#[tokio::test(flavor = "multi_thread")]
async fn replaced_webhook_events_rejected(world: WebhookWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/webhook_lifecycle.feature",
    name = "A redelivered event is accepted once"
)]
#[tokio::test(flavor = "multi_thread")]
async fn redelivered_event_accepted_once(world: WebhookWorld) {
    let _ = world;
}
