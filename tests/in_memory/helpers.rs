//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use rstest::fixture;
use trello_integration::contract::domain::{Board, List, Member};
use trello_integration::dispatch::{
    adapters::InMemoryTrelloGateway, services::ActionDispatchService,
};

/// Callback URL used by webhook scenarios.
pub const CALLBACK_URL: &str = "https://hooks.example.test/trello";

/// A seeded workspace with one board, one list, and one member.
pub struct SeededWorkspace {
    pub gateway: Arc<InMemoryTrelloGateway>,
    pub dispatcher: ActionDispatchService<InMemoryTrelloGateway>,
    pub board: Board,
    pub list: List,
    pub member: Member,
}

/// Provides a fresh seeded workspace for each test.
#[fixture]
pub fn seeded() -> SeededWorkspace {
    let gateway = Arc::new(InMemoryTrelloGateway::new());
    let board = gateway.seed_board("Roadmap").expect("board seeds");
    let list = gateway.seed_list(&board.id, "Doing").expect("list seeds");
    let member = gateway
        .seed_member(&board.id, "Ada Lovelace", "ada")
        .expect("member seeds");
    let dispatcher = ActionDispatchService::new(Arc::clone(&gateway));
    SeededWorkspace {
        gateway,
        dispatcher,
        board,
        list,
        member,
    }
}
