//! Given steps for webhook lifecycle BDD scenarios.

use super::world::{CALLBACK_URL, WebhookWorld};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use trello_integration::contract::domain::TrelloId;

#[given(r#"the integration is registered for board "{board_id}""#)]
fn integration_registered(world: &mut WebhookWorld, board_id: String) -> Result<(), eyre::Report> {
    world
        .register(&board_id)
        .wrap_err("register integration for scenario setup")
}

#[given(r#"a leaked webhook for board "{board_id}""#)]
fn leaked_webhook(world: &mut WebhookWorld, board_id: String) -> Result<(), eyre::Report> {
    let board = TrelloId::new(board_id)?;
    world
        .remote
        .seed_webhook(&board, CALLBACK_URL)
        .wrap_err("seed leaked webhook")?;
    Ok(())
}
