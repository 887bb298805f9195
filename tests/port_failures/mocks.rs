//! Mock port implementations.

use async_trait::async_trait;
use mockall::mock;
use trello_integration::contract::domain::{Board, Card, List, Member, TrelloId};
use trello_integration::dispatch::ports::{CardFieldChanges, NewCard, TrelloGateway};
use trello_integration::remote::RemoteResult;
use trello_integration::webhook::domain::{RemoteWebhook, WebhookRegistrationState};
use trello_integration::webhook::ports::{
    WebhookRemote, WebhookStateStore, WebhookStateStoreResult,
};

mock! {
    pub Remote {}

    #[async_trait]
    impl WebhookRemote for Remote {
        async fn create_webhook(
            &self,
            model_id: &TrelloId,
            callback_url: &str,
        ) -> RemoteResult<RemoteWebhook>;
        async fn delete_webhook(&self, webhook_id: &TrelloId) -> RemoteResult<()>;
        async fn list_webhooks(&self) -> RemoteResult<Vec<RemoteWebhook>>;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl WebhookStateStore for Store {
        async fn load(&self) -> WebhookStateStoreResult<WebhookRegistrationState>;
        async fn save(&self, state: &WebhookRegistrationState) -> WebhookStateStoreResult<()>;
    }
}

mock! {
    pub Gateway {}

    #[async_trait]
    impl TrelloGateway for Gateway {
        async fn list_boards(&self) -> RemoteResult<Vec<Board>>;
        async fn get_board(&self, board_id: &TrelloId) -> RemoteResult<Board>;
        async fn get_list(&self, list_id: &TrelloId) -> RemoteResult<List>;
        async fn lists_in_board(&self, board_id: &TrelloId) -> RemoteResult<Vec<List>>;
        async fn board_members(&self, board_id: &TrelloId) -> RemoteResult<Vec<Member>>;
        async fn card_members(&self, card_id: &TrelloId) -> RemoteResult<Vec<Member>>;
        async fn get_member(&self, id_or_username: &str) -> RemoteResult<Member>;
        async fn get_card(&self, card_id: &TrelloId) -> RemoteResult<Card>;
        async fn cards_in_list(&self, list_id: &TrelloId) -> RemoteResult<Vec<Card>>;
        async fn create_card(&self, card: &NewCard) -> RemoteResult<Card>;
        async fn update_card_fields(
            &self,
            card_id: &TrelloId,
            changes: &CardFieldChanges,
        ) -> RemoteResult<()>;
        async fn add_card_member(
            &self,
            card_id: &TrelloId,
            member_id: &TrelloId,
        ) -> RemoteResult<()>;
        async fn remove_card_member(
            &self,
            card_id: &TrelloId,
            member_id: &TrelloId,
        ) -> RemoteResult<()>;
        async fn add_card_label(&self, card_id: &TrelloId, label_id: &TrelloId) -> RemoteResult<()>;
        async fn remove_card_label(
            &self,
            card_id: &TrelloId,
            label_id: &TrelloId,
        ) -> RemoteResult<()>;
        async fn add_comment(&self, card_id: &TrelloId, text: &str) -> RemoteResult<TrelloId>;
        async fn move_card_to_position(
            &self,
            card_id: &TrelloId,
            position: usize,
        ) -> RemoteResult<()>;
        async fn move_card_to_list(
            &self,
            card_id: &TrelloId,
            list_id: &TrelloId,
        ) -> RemoteResult<()>;
    }
}

/// Parses a test identifier.
pub fn id(raw: &str) -> TrelloId {
    TrelloId::new(raw).expect("valid test identifier")
}
