//! End-to-end action contract flows through the dispatcher.

use super::helpers::{SeededWorkspace, seeded};
use rstest::rstest;
use serde_json::{Value, json};
use trello_integration::contract::{ActionRegistry, domain::ActionName};

fn ids(items: &Value) -> Vec<Value> {
    items
        .as_array()
        .map(|entries| entries.iter().map(|entry| entry["id"].clone()).collect())
        .unwrap_or_default()
}

#[test]
fn registry_describes_every_action() {
    let registry = ActionRegistry::builtin();
    let described = registry.describe();

    assert_eq!(registry.len(), ActionName::ALL.len());
    for name in ActionName::ALL {
        let entry = &described[name.as_str()];
        assert_eq!(entry["input"]["type"], json!("object"), "{name}");
        assert_eq!(entry["output"]["type"], json!("object"), "{name}");
    }
    assert_eq!(described["moveCardUp"]["idempotent"], json!(false));
    assert_eq!(described["getCardById"]["idempotent"], json!(true));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn card_lifecycle_round_trip(seeded: SeededWorkspace) {
    let created = seeded
        .dispatcher
        .dispatch(
            "createCard",
            &json!({
                "listId": seeded.list.id,
                "cardName": "Ship it",
                "cardBody": "Release 1.0",
                "members": [seeded.member.id],
                "dueDate": "2025-06-01T12:00:00Z"
            }),
        )
        .await
        .expect("card creation should succeed");
    let card_id = created["newCardId"].clone();

    let members = seeded
        .dispatcher
        .dispatch("getCardMembers", &json!({ "cardId": card_id }))
        .await
        .expect("member listing should succeed");
    assert_eq!(ids(&members["members"]), vec![json!(seeded.member.id)]);

    seeded
        .dispatcher
        .dispatch(
            "updateCard",
            &json!({
                "cardId": card_id,
                "completeState": "complete",
                "membersToRemove": [seeded.member.id]
            }),
        )
        .await
        .expect("update should succeed");

    let fetched = seeded
        .dispatcher
        .dispatch("getCardById", &json!({ "cardId": card_id }))
        .await
        .expect("lookup should succeed");
    let card = &fetched["card"];
    assert_eq!(card["name"], json!("Ship it"));
    assert_eq!(card["description"], json!("Release 1.0"));
    assert_eq!(card["isCompleted"], json!(true));
    assert_eq!(card["members"], json!([]));
    assert_eq!(card["dueDate"], json!("2025-06-01T12:00:00Z"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookups_by_name_and_username(seeded: SeededWorkspace) {
    let boards = seeded
        .dispatcher
        .dispatch("getBoardsByDisplayName", &json!({ "boardName": "Roadmap" }))
        .await
        .expect("board lookup should succeed");
    let lists = seeded
        .dispatcher
        .dispatch(
            "getListsByDisplayName",
            &json!({ "boardId": seeded.board.id, "listName": "Doing" }),
        )
        .await
        .expect("list lookup should succeed");
    let member = seeded
        .dispatcher
        .dispatch("getMemberByIdOrUsername", &json!({ "memberIdOrUsername": "ada" }))
        .await
        .expect("member lookup should succeed");

    assert_eq!(ids(&boards["boards"]), vec![json!(seeded.board.id)]);
    assert_eq!(ids(&lists["lists"]), vec![json!(seeded.list.id)]);
    assert_eq!(member["member"]["id"], json!(seeded.member.id));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_members_and_lists_are_listed(seeded: SeededWorkspace) {
    let members = seeded
        .dispatcher
        .dispatch("getBoardMembers", &json!({ "boardId": seeded.board.id }))
        .await
        .expect("member listing should succeed");
    let lists = seeded
        .dispatcher
        .dispatch("getListsInBoard", &json!({ "boardId": seeded.board.id }))
        .await
        .expect("list listing should succeed");
    let board = seeded
        .dispatcher
        .dispatch("getBoardById", &json!({ "boardId": seeded.board.id }))
        .await
        .expect("board lookup should succeed");
    let list = seeded
        .dispatcher
        .dispatch("getListById", &json!({ "listId": seeded.list.id }))
        .await
        .expect("list lookup should succeed");

    assert_eq!(members["members"][0]["username"], json!("ada"));
    assert_eq!(ids(&lists["lists"]), vec![json!(seeded.list.id)]);
    assert_eq!(board["board"]["name"], json!("Roadmap"));
    assert_eq!(list["list"]["boardId"], json!(seeded.board.id));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_card_surfaces_permanent_remote_error(seeded: SeededWorkspace) {
    let error = seeded
        .dispatcher
        .dispatch("getCardById", &json!({ "cardId": "5f1e2d3c4b5a69788796a5b4" }))
        .await
        .expect_err("unknown card must fail");

    assert!(!error.is_retryable());
    assert!(error.remote_failure().is_some_and(|failure| failure.is_not_found()));
    assert!(seeded.gateway.mutations().expect("journal").is_empty());
}

#[rstest]
#[case(json!({ "listId": "L1", "cardName": "Ship it" }), "listId")]
#[case(json!({ "listId": "5f1e2d3c4b5a69788796a5b4" }), "cardName")]
#[case(
    json!({ "listId": "5f1e2d3c4b5a69788796a5b4", "cardName": "Ship it", "priority": 1 }),
    "priority"
)]
#[case(
    json!({ "listId": "5f1e2d3c4b5a69788796a5b4", "cardName": "x", "dueDate": "tomorrow" }),
    "dueDate"
)]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_create_card_input_names_the_field(
    seeded: SeededWorkspace,
    #[case] input: Value,
    #[case] field: &str,
) {
    let error = seeded
        .dispatcher
        .dispatch("createCard", &input)
        .await
        .expect_err("input must be rejected");

    assert!(error.to_string().contains(field), "{error}");
    assert!(seeded.gateway.mutations().expect("journal").is_empty());
}
