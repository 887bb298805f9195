//! Typed action outputs surfaced to callers after output validation.

use super::{Board, Card, List, Member, TrelloId};
use serde::{Deserialize, Serialize};

/// Outcome message of a mutating action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MessageOutput {
    /// Human-readable outcome.
    pub message: String,
}

/// Output of `createCard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCardOutput {
    /// Human-readable outcome.
    pub message: String,
    /// Identifier issued for the new card.
    pub new_card_id: TrelloId,
}

/// Output of `addCardComment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddCardCommentOutput {
    /// Human-readable outcome.
    pub message: String,
    /// Identifier issued for the new comment.
    pub new_comment_id: TrelloId,
}

/// Output carrying one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardOutput {
    /// The board.
    pub board: Board,
}

/// Output carrying several boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardsOutput {
    /// The boards.
    pub boards: Vec<Board>,
}

/// Output carrying one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListOutput {
    /// The list.
    pub list: List,
}

/// Output carrying several lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListsOutput {
    /// The lists.
    pub lists: Vec<List>,
}

/// Output carrying one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardOutput {
    /// The card.
    pub card: Card,
}

/// Output carrying several cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardsOutput {
    /// The cards.
    pub cards: Vec<Card>,
}

/// Output carrying one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberOutput {
    /// The member.
    pub member: Member,
}

/// Output carrying several members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MembersOutput {
    /// The members.
    pub members: Vec<Member>,
}

/// Any action output, serialised without a discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionOutput {
    /// Bare outcome message.
    Message(MessageOutput),
    /// Created card.
    CreatedCard(CreateCardOutput),
    /// Added comment.
    AddedComment(AddCardCommentOutput),
    /// One board.
    Board(BoardOutput),
    /// Several boards.
    Boards(BoardsOutput),
    /// One list.
    List(ListOutput),
    /// Several lists.
    Lists(ListsOutput),
    /// One card.
    Card(CardOutput),
    /// Several cards.
    Cards(CardsOutput),
    /// One member.
    Member(MemberOutput),
    /// Several members.
    Members(MembersOutput),
}

impl ActionOutput {
    /// Wraps an outcome message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(MessageOutput {
            message: message.into(),
        })
    }
}
