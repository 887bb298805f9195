//! Remote-call port for Trello board, list, card, and member operations.

use crate::contract::domain::{Board, Card, FieldUpdate, List, Member, TrelloId};
use crate::remote::RemoteResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Attributes of a card to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    /// List receiving the card.
    pub list_id: TrelloId,
    /// Card name.
    pub name: String,
    /// Body text.
    pub description: Option<String>,
    /// Members to assign.
    pub members: Vec<TrelloId>,
    /// Labels to attach.
    pub labels: Vec<TrelloId>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
}

/// Scalar card attributes changed by one remote call.
///
/// `None` and [`FieldUpdate::Keep`] leave the remote value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFieldChanges {
    /// New name.
    pub name: Option<String>,
    /// New body text.
    pub description: Option<String>,
    /// New archive flag.
    pub closed: Option<bool>,
    /// New completion flag.
    pub completed: Option<bool>,
    /// Due date change.
    pub due_date: FieldUpdate<DateTime<Utc>>,
}

impl CardFieldChanges {
    /// Returns whether no attribute is changed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.closed.is_none()
            && self.completed.is_none()
            && self.due_date.is_keep()
    }
}

/// Remote Trello operations used by the action dispatcher.
///
/// Implementations translate transport failures into
/// [`crate::remote::RemoteServiceError`].
#[async_trait]
pub trait TrelloGateway: Send + Sync {
    /// Lists every board visible to the credentials.
    async fn list_boards(&self) -> RemoteResult<Vec<Board>>;

    /// Fetches one board.
    async fn get_board(&self, board_id: &TrelloId) -> RemoteResult<Board>;

    /// Fetches one list.
    async fn get_list(&self, list_id: &TrelloId) -> RemoteResult<List>;

    /// Lists the lists of a board in display order.
    async fn lists_in_board(&self, board_id: &TrelloId) -> RemoteResult<Vec<List>>;

    /// Lists the members of a board.
    async fn board_members(&self, board_id: &TrelloId) -> RemoteResult<Vec<Member>>;

    /// Lists the members assigned to a card.
    async fn card_members(&self, card_id: &TrelloId) -> RemoteResult<Vec<Member>>;

    /// Fetches a member by identifier or username.
    async fn get_member(&self, id_or_username: &str) -> RemoteResult<Member>;

    /// Fetches one card.
    async fn get_card(&self, card_id: &TrelloId) -> RemoteResult<Card>;

    /// Lists the cards of a list in display order.
    async fn cards_in_list(&self, list_id: &TrelloId) -> RemoteResult<Vec<Card>>;

    /// Creates a card and returns it as stored remotely.
    async fn create_card(&self, card: &NewCard) -> RemoteResult<Card>;

    /// Changes scalar attributes of a card.
    async fn update_card_fields(
        &self,
        card_id: &TrelloId,
        changes: &CardFieldChanges,
    ) -> RemoteResult<()>;

    /// Assigns a member to a card.
    async fn add_card_member(&self, card_id: &TrelloId, member_id: &TrelloId) -> RemoteResult<()>;

    /// Unassigns a member from a card.
    async fn remove_card_member(
        &self,
        card_id: &TrelloId,
        member_id: &TrelloId,
    ) -> RemoteResult<()>;

    /// Attaches a label to a card.
    async fn add_card_label(&self, card_id: &TrelloId, label_id: &TrelloId) -> RemoteResult<()>;

    /// Detaches a label from a card.
    async fn remove_card_label(&self, card_id: &TrelloId, label_id: &TrelloId)
    -> RemoteResult<()>;

    /// Adds a comment to a card and returns the comment identifier.
    async fn add_comment(&self, card_id: &TrelloId, text: &str) -> RemoteResult<TrelloId>;

    /// Moves a card to a zero-based position within its current list.
    async fn move_card_to_position(&self, card_id: &TrelloId, position: usize)
    -> RemoteResult<()>;

    /// Moves a card to the end of another list.
    async fn move_card_to_list(&self, card_id: &TrelloId, list_id: &TrelloId) -> RemoteResult<()>;
}
