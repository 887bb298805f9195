//! When steps for webhook lifecycle BDD scenarios.

use super::world::{WebhookWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use serde_json::json;
use trello_integration::configuration::{IntegrationConfiguration, Secret};
use trello_integration::webhook::domain::{InboundWebhookEvent, RemoteWebhook};

#[when(r#"the integration registers for board "{board_id}""#)]
fn integration_registers(world: &mut WebhookWorld, board_id: String) -> Result<(), eyre::Report> {
    world.register(&board_id).wrap_err("register integration")
}

#[when("the integration is installed without a board")]
fn installed_without_board(world: &mut WebhookWorld) {
    let configuration =
        IntegrationConfiguration::new(Secret::new("key"), Secret::new("token"), None);
    world.last_install = Some(run_async(world.service.install(&configuration)));
}

fn deliver(
    world: &mut WebhookWorld,
    webhook: &RemoteWebhook,
    action_id: &str,
) -> Result<(), eyre::Report> {
    let event = InboundWebhookEvent::from_payload(
        webhook.id.clone(),
        &json!({
            "action": { "id": action_id, "type": "updateCard" },
            "model": { "id": webhook.model_id }
        }),
    )?;
    let result = run_async(world.service.ingest(&event));
    world.event_results.push(result);
    Ok(())
}

#[when(r#"event "{action_id}" is delivered to the current webhook"#)]
fn event_to_current(world: &mut WebhookWorld, action_id: String) -> Result<(), eyre::Report> {
    let webhook = world
        .registrations
        .last()
        .cloned()
        .ok_or_else(|| eyre::eyre!("no webhook registered in scenario world"))?;
    deliver(world, &webhook, &action_id)
}

#[when(r#"event "{action_id}" is delivered to the previous webhook"#)]
fn event_to_previous(world: &mut WebhookWorld, action_id: String) -> Result<(), eyre::Report> {
    let webhook = world
        .registrations
        .iter()
        .rev()
        .nth(1)
        .cloned()
        .ok_or_else(|| eyre::eyre!("scenario world needs two registrations"))?;
    deliver(world, &webhook, &action_id)
}
