//! Card update rollback observed at the gateway boundary.

use super::mocks::{MockGateway, id};
use mockall::{Sequence, predicate::eq};
use serde_json::json;
use std::sync::Arc;
use trello_integration::contract::domain::Card;
use trello_integration::dispatch::ports::CardFieldChanges;
use trello_integration::dispatch::services::{ActionDispatchError, ActionDispatchService};
use trello_integration::remote::{RemoteFailureKind, RemoteServiceError};

const CARD_ID: &str = "5f1e2d3c4b5a69788796a5b4";
const LIST_ID: &str = "5f1e2d3c4b5a69788796a5b5";
const MEMBER_ID: &str = "60a1b2c3d4e5f60718293a4b";

fn snapshot() -> Card {
    Card {
        id: id(CARD_ID),
        name: "Ship it".to_owned(),
        description: None,
        list_id: id(LIST_ID),
        is_closed: false,
        is_completed: false,
        due_date: None,
        members: Vec::new(),
        labels: Vec::new(),
    }
}

fn renamed(name: &str) -> CardFieldChanges {
    CardFieldChanges {
        name: Some(name.to_owned()),
        ..CardFieldChanges::default()
    }
}

fn rejected(operation: &str) -> RemoteServiceError {
    RemoteServiceError::new(operation, RemoteFailureKind::PermissionDenied, "not allowed")
}

fn gateway_failing_member_add(rollback_fails: bool) -> MockGateway {
    let mut sequence = Sequence::new();
    let mut gateway = MockGateway::new();
    gateway
        .expect_get_card()
        .with(eq(id(CARD_ID)))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(snapshot()));
    gateway
        .expect_update_card_fields()
        .with(eq(id(CARD_ID)), eq(renamed("Shipped")))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(()));
    gateway
        .expect_add_card_member()
        .with(eq(id(CARD_ID)), eq(id(MEMBER_ID)))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Err(rejected("add_card_member")));
    gateway
        .expect_update_card_fields()
        .with(eq(id(CARD_ID)), eq(renamed("Ship it")))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(move |_, _| {
            if rollback_fails {
                Err(rejected("update_card_fields"))
            } else {
                Ok(())
            }
        });
    gateway
}

fn update_input() -> serde_json::Value {
    json!({ "cardId": CARD_ID, "name": "Shipped", "membersToAdd": [MEMBER_ID] })
}

#[tokio::test]
async fn failed_member_add_restores_the_original_name() {
    let service = ActionDispatchService::new(Arc::new(gateway_failing_member_add(false)));

    let error = service
        .dispatch("updateCard", &update_input())
        .await
        .expect_err("update must fail");

    assert!(matches!(error, ActionDispatchError::Remote { .. }), "{error}");
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn failed_restore_is_reported_with_both_causes() {
    let service = ActionDispatchService::new(Arc::new(gateway_failing_member_add(true)));

    let error = service
        .dispatch("updateCard", &update_input())
        .await
        .expect_err("update must fail");

    let ActionDispatchError::RollbackFailed { card_id, cause, rollback } = error else {
        panic!("expected a rollback failure");
    };
    assert_eq!(card_id, id(CARD_ID));
    assert_eq!(cause.operation(), "add_card_member");
    assert_eq!(rollback.operation(), "update_card_fields");
}

#[tokio::test]
async fn invalid_input_never_reaches_the_gateway() {
    let mut gateway = MockGateway::new();
    gateway.expect_get_card().never();
    gateway.expect_update_card_fields().never();
    let service = ActionDispatchService::new(Arc::new(gateway));

    let error = service
        .dispatch("updateCard", &json!({ "cardId": CARD_ID, "closedState": "deleted" }))
        .await
        .expect_err("invalid input must be rejected");

    assert!(matches!(error, ActionDispatchError::InvalidInput { .. }));
}
