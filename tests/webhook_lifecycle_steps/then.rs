//! Then steps for webhook lifecycle BDD scenarios.

use super::world::{WebhookWorld, run_async};
use rstest_bdd_macros::then;
use trello_integration::webhook::services::{
    IngestOutcome, InstallOutcome, StateConsistencyError, WebhookLifecycleError,
};

fn live_count(world: &WebhookWorld) -> Result<usize, eyre::Report> {
    Ok(world.remote.live_webhooks()?.len())
}

fn expect_live(world: &WebhookWorld, count: usize) -> Result<(), eyre::Report> {
    let live = live_count(world)?;
    if live != count {
        return Err(eyre::eyre!("expected {count} live webhooks, found {live}"));
    }
    Ok(())
}

#[then("exactly {count:usize} webhook is live")]
fn one_webhook_live(world: &WebhookWorld, count: usize) -> Result<(), eyre::Report> {
    expect_live(world, count)
}

#[then("exactly {count:usize} webhooks are live")]
fn webhooks_live(world: &WebhookWorld, count: usize) -> Result<(), eyre::Report> {
    expect_live(world, count)
}

#[then("the stored webhook is the live webhook")]
fn stored_matches_live(world: &WebhookWorld) -> Result<(), eyre::Report> {
    let state = run_async(world.service.state())?;
    let live = world.remote.live_webhooks()?;
    let stored = state
        .webhook_id()
        .ok_or_else(|| eyre::eyre!("expected a stored registration"))?;
    if !live.iter().any(|webhook| webhook.id == *stored) {
        return Err(eyre::eyre!("stored webhook {stored} is not live"));
    }
    Ok(())
}

#[then("installation was skipped")]
fn installation_skipped(world: &WebhookWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_install
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing install result in scenario world"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("install failed: {err}"))?;
    if *outcome != InstallOutcome::Skipped {
        return Err(eyre::eyre!("expected skipped install, got {outcome:?}"));
    }
    Ok(())
}

#[then("the integration is unregistered")]
fn integration_unregistered(world: &WebhookWorld) -> Result<(), eyre::Report> {
    let state = run_async(world.service.state())?;
    if state.is_registered() {
        return Err(eyre::eyre!("expected no stored registration, found {state}"));
    }
    Ok(())
}

#[then("the event is rejected")]
fn event_rejected(world: &WebhookWorld) -> Result<(), eyre::Report> {
    match world.event_results.last() {
        Some(Err(WebhookLifecycleError::State(StateConsistencyError::WebhookIdMismatch {
            ..
        }))) => Ok(()),
        other => Err(eyre::eyre!("expected a webhook id mismatch, got {other:?}")),
    }
}

#[then(r#"the event outcomes are "{outcomes}""#)]
fn event_outcomes(world: &WebhookWorld, outcomes: String) -> Result<(), eyre::Report> {
    let observed = world
        .event_results
        .iter()
        .map(|result| match result {
            Ok(IngestOutcome::Accepted) => Ok("accepted"),
            Ok(IngestOutcome::Duplicate) => Ok("duplicate"),
            Err(err) => Err(eyre::eyre!("event was rejected: {err}")),
        })
        .collect::<Result<Vec<_>, _>>()?
        .join(", ");
    if observed != outcomes {
        return Err(eyre::eyre!("expected outcomes [{outcomes}], got [{observed}]"));
    }
    Ok(())
}
