//! Typed action inputs decoded from validated documents.

use super::TrelloId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::num::NonZeroUsize;

/// Archive state of a card expressed as a closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosedState {
    /// The card is visible on its list.
    Open,
    /// The card is archived.
    Archived,
}

impl ClosedState {
    /// Wire literals accepted for this enumeration.
    pub const LITERALS: &'static [&'static str] = &["open", "archived"];

    /// Returns whether this state archives the card.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Archived)
    }
}

/// Completion state of a card expressed as a closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompleteState {
    /// The card is marked complete.
    Complete,
    /// The card is not marked complete.
    Incomplete,
}

impl CompleteState {
    /// Wire literals accepted for this enumeration.
    pub const LITERALS: &'static [&'static str] = &["complete", "incomplete"];

    /// Returns whether this state marks the card complete.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Partial-update intent for a clearable field.
///
/// An omitted field decodes as [`FieldUpdate::Keep`], an explicit `null` as
/// [`FieldUpdate::Clear`], and any other value as [`FieldUpdate::Set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the remote value unchanged.
    Keep,
    /// Replace the remote value.
    Set(T),
    /// Remove the remote value.
    Clear,
}

impl<T> FieldUpdate<T> {
    /// Returns whether the field is left unchanged.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Borrows the carried value.
    #[must_use]
    pub const fn as_ref(&self) -> FieldUpdate<&T> {
        match self {
            Self::Keep => FieldUpdate::Keep,
            Self::Set(value) => FieldUpdate::Set(value),
            Self::Clear => FieldUpdate::Clear,
        }
    }
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

impl<T> Serialize for FieldUpdate<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Set(value) => serializer.serialize_some(value),
            Self::Keep | Self::Clear => serializer.serialize_none(),
        }
    }
}

const fn one_space() -> NonZeroUsize {
    NonZeroUsize::MIN
}

/// Input naming a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BoardIdInput {
    /// Board identifier.
    pub board_id: TrelloId,
}

/// Input naming a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListIdInput {
    /// List identifier.
    pub list_id: TrelloId,
}

/// Input naming a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CardIdInput {
    /// Card identifier.
    pub card_id: TrelloId,
}

/// Input for `getBoardsByDisplayName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BoardNameInput {
    /// Display name to match.
    pub board_name: String,
}

/// Input for `getListsByDisplayName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListNameInput {
    /// Board to search.
    pub board_id: TrelloId,
    /// Display name to match.
    pub list_name: String,
}

/// Input for `getCardsByDisplayName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CardNameInput {
    /// List to search.
    pub list_id: TrelloId,
    /// Display name to match.
    pub card_name: String,
}

/// Input for `getMemberByIdOrUsername`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MemberLookupInput {
    /// Member identifier or username.
    pub member_id_or_username: String,
}

/// Input for `createCard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCardInput {
    /// List receiving the new card.
    pub list_id: TrelloId,
    /// Name of the new card.
    pub card_name: String,
    /// Body text of the new card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_body: Option<String>,
    /// Members to assign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<TrelloId>>,
    /// Labels to attach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<TrelloId>>,
    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for `updateCard`.
///
/// Every mutable field is optional and omission leaves the remote value
/// unchanged. Relation changes are expressed as disjoint add and remove
/// lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCardInput {
    /// Card to update.
    pub card_id: TrelloId,
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    /// New archive state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_state: Option<ClosedState>,
    /// New completion state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_state: Option<CompleteState>,
    /// Members to assign.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_to_add: Vec<TrelloId>,
    /// Members to unassign.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_to_remove: Vec<TrelloId>,
    /// Labels to attach.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels_to_add: Vec<TrelloId>,
    /// Labels to detach.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels_to_remove: Vec<TrelloId>,
    /// Due date change.
    #[serde(default, skip_serializing_if = "FieldUpdate::is_keep")]
    pub due_date: FieldUpdate<DateTime<Utc>>,
}

/// Input for `addCardComment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddCardCommentInput {
    /// Card receiving the comment.
    pub card_id: TrelloId,
    /// Comment text.
    pub comment_body: String,
}

/// Input for `moveCardUp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MoveCardUpInput {
    /// Card to move.
    pub card_id: TrelloId,
    /// Number of positions to move towards the top of the list.
    #[serde(default = "one_space")]
    pub move_up_by_n_spaces: NonZeroUsize,
}

/// Input for `moveCardDown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MoveCardDownInput {
    /// Card to move.
    pub card_id: TrelloId,
    /// Number of positions to move towards the bottom of the list.
    #[serde(default = "one_space")]
    pub move_down_by_n_spaces: NonZeroUsize,
}

/// Input for `moveCardToList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MoveCardToListInput {
    /// Card to move.
    pub card_id: TrelloId,
    /// Destination list on the same board.
    pub new_list_id: TrelloId,
}
