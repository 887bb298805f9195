//! Action names, definitions, and decoded requests.

use super::requests::{
    AddCardCommentInput, BoardIdInput, BoardNameInput, CardIdInput, CardNameInput,
    CreateCardInput, ListIdInput, ListNameInput, MemberLookupInput, MoveCardDownInput,
    MoveCardToListInput, MoveCardUpInput, UpdateCardInput,
};
use super::{ActionOutput, ObjectSchema, ValidationError, ValidationErrorKind};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of a supported remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionName {
    /// `getAllBoards`
    GetAllBoards,
    /// `getBoardById`
    GetBoardById,
    /// `getBoardsByDisplayName`
    GetBoardsByDisplayName,
    /// `getListById`
    GetListById,
    /// `getListsInBoard`
    GetListsInBoard,
    /// `getListsByDisplayName`
    GetListsByDisplayName,
    /// `getBoardMembers`
    GetBoardMembers,
    /// `getCardMembers`
    GetCardMembers,
    /// `getMemberByIdOrUsername`
    GetMemberByIdOrUsername,
    /// `getCardById`
    GetCardById,
    /// `getCardsByDisplayName`
    GetCardsByDisplayName,
    /// `getCardsInList`
    GetCardsInList,
    /// `createCard`
    CreateCard,
    /// `updateCard`
    UpdateCard,
    /// `addCardComment`
    AddCardComment,
    /// `moveCardUp`
    MoveCardUp,
    /// `moveCardDown`
    MoveCardDown,
    /// `moveCardToList`
    MoveCardToList,
}

impl ActionName {
    /// Every supported action in registry order.
    pub const ALL: [Self; 18] = [
        Self::GetAllBoards,
        Self::GetBoardById,
        Self::GetBoardsByDisplayName,
        Self::GetListById,
        Self::GetListsInBoard,
        Self::GetListsByDisplayName,
        Self::GetBoardMembers,
        Self::GetCardMembers,
        Self::GetMemberByIdOrUsername,
        Self::GetCardById,
        Self::GetCardsByDisplayName,
        Self::GetCardsInList,
        Self::CreateCard,
        Self::UpdateCard,
        Self::AddCardComment,
        Self::MoveCardUp,
        Self::MoveCardDown,
        Self::MoveCardToList,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetAllBoards => "getAllBoards",
            Self::GetBoardById => "getBoardById",
            Self::GetBoardsByDisplayName => "getBoardsByDisplayName",
            Self::GetListById => "getListById",
            Self::GetListsInBoard => "getListsInBoard",
            Self::GetListsByDisplayName => "getListsByDisplayName",
            Self::GetBoardMembers => "getBoardMembers",
            Self::GetCardMembers => "getCardMembers",
            Self::GetMemberByIdOrUsername => "getMemberByIdOrUsername",
            Self::GetCardById => "getCardById",
            Self::GetCardsByDisplayName => "getCardsByDisplayName",
            Self::GetCardsInList => "getCardsInList",
            Self::CreateCard => "createCard",
            Self::UpdateCard => "updateCard",
            Self::AddCardComment => "addCardComment",
            Self::MoveCardUp => "moveCardUp",
            Self::MoveCardDown => "moveCardDown",
            Self::MoveCardToList => "moveCardToList",
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a name does not denote a supported action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown action: {0}")]
pub struct UnknownActionError(pub String);

impl FromStr for ActionName {
    type Err = UnknownActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == value)
            .ok_or_else(|| UnknownActionError(value.to_owned()))
    }
}

impl TryFrom<&str> for ActionName {
    type Error = UnknownActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Whether repeating an action with the same input yields the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaySafety {
    /// Repeating the call converges on the same remote state.
    Idempotent,
    /// Repeating the call changes the outcome.
    NotIdempotent,
}

impl ReplaySafety {
    /// Returns whether an automatic retry is safe.
    #[must_use]
    pub const fn is_replay_safe(self) -> bool {
        matches!(self, Self::Idempotent)
    }
}

/// Immutable contract of one remote operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDefinition {
    name: ActionName,
    title: &'static str,
    description: &'static str,
    input: ObjectSchema,
    output: ObjectSchema,
    replay: ReplaySafety,
}

impl ActionDefinition {
    /// Creates an idempotent action definition.
    #[must_use]
    pub const fn new(
        name: ActionName,
        title: &'static str,
        description: &'static str,
        input: ObjectSchema,
        output: ObjectSchema,
    ) -> Self {
        Self {
            name,
            title,
            description,
            input,
            output,
            replay: ReplaySafety::Idempotent,
        }
    }

    /// Marks the action as unsafe to replay.
    #[must_use]
    pub const fn not_idempotent(mut self) -> Self {
        self.replay = ReplaySafety::NotIdempotent;
        self
    }

    /// Returns the action name.
    #[must_use]
    pub const fn name(&self) -> ActionName {
        self.name
    }

    /// Returns the display title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.title
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// Returns the input schema.
    #[must_use]
    pub const fn input(&self) -> &ObjectSchema {
        &self.input
    }

    /// Returns the output schema.
    #[must_use]
    pub const fn output(&self) -> &ObjectSchema {
        &self.output
    }

    /// Returns the replay classification.
    #[must_use]
    pub const fn replay(&self) -> ReplaySafety {
        self.replay
    }

    /// Validates caller input and decodes it into a typed request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the input violates the input schema.
    pub fn validate_input(&self, input: &Value) -> Result<ActionRequest, ValidationError> {
        let normalized = self.input.validate(input)?;
        ActionRequest::decode(self.name, normalized)
    }

    /// Validates an output against the output schema and returns the wire
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the output violates the output schema.
    pub fn validate_output(&self, output: &ActionOutput) -> Result<Value, ValidationError> {
        let document = serde_json::to_value(output).map_err(|error| {
            ValidationError::at_root(ValidationErrorKind::Undecodable(error.to_string()))
        })?;
        self.output.validate(&document)
    }

    /// Renders the definition with JSON Schemas for its input and output.
    #[must_use]
    pub fn describe(&self) -> Value {
        json!({
            "name": self.name.as_str(),
            "title": self.title,
            "description": self.description,
            "idempotent": self.replay.is_replay_safe(),
            "input": self.input.to_json_schema(),
            "output": self.output.to_json_schema(),
        })
    }
}

/// Validated, typed request for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    /// `getAllBoards`
    GetAllBoards,
    /// `getBoardById`
    GetBoardById(BoardIdInput),
    /// `getBoardsByDisplayName`
    GetBoardsByDisplayName(BoardNameInput),
    /// `getListById`
    GetListById(ListIdInput),
    /// `getListsInBoard`
    GetListsInBoard(BoardIdInput),
    /// `getListsByDisplayName`
    GetListsByDisplayName(ListNameInput),
    /// `getBoardMembers`
    GetBoardMembers(BoardIdInput),
    /// `getCardMembers`
    GetCardMembers(CardIdInput),
    /// `getMemberByIdOrUsername`
    GetMemberByIdOrUsername(MemberLookupInput),
    /// `getCardById`
    GetCardById(CardIdInput),
    /// `getCardsByDisplayName`
    GetCardsByDisplayName(CardNameInput),
    /// `getCardsInList`
    GetCardsInList(ListIdInput),
    /// `createCard`
    CreateCard(CreateCardInput),
    /// `updateCard`
    UpdateCard(UpdateCardInput),
    /// `addCardComment`
    AddCardComment(AddCardCommentInput),
    /// `moveCardUp`
    MoveCardUp(MoveCardUpInput),
    /// `moveCardDown`
    MoveCardDown(MoveCardDownInput),
    /// `moveCardToList`
    MoveCardToList(MoveCardToListInput),
}

impl ActionRequest {
    /// Decodes a schema-normalised document into the request for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrorKind::Undecodable`] when the document does
    /// not fit the typed request.
    pub fn decode(name: ActionName, document: Value) -> Result<Self, ValidationError> {
        Ok(match name {
            ActionName::GetAllBoards => Self::GetAllBoards,
            ActionName::GetBoardById => Self::GetBoardById(typed(document)?),
            ActionName::GetBoardsByDisplayName => Self::GetBoardsByDisplayName(typed(document)?),
            ActionName::GetListById => Self::GetListById(typed(document)?),
            ActionName::GetListsInBoard => Self::GetListsInBoard(typed(document)?),
            ActionName::GetListsByDisplayName => Self::GetListsByDisplayName(typed(document)?),
            ActionName::GetBoardMembers => Self::GetBoardMembers(typed(document)?),
            ActionName::GetCardMembers => Self::GetCardMembers(typed(document)?),
            ActionName::GetMemberByIdOrUsername => {
                Self::GetMemberByIdOrUsername(typed(document)?)
            }
            ActionName::GetCardById => Self::GetCardById(typed(document)?),
            ActionName::GetCardsByDisplayName => Self::GetCardsByDisplayName(typed(document)?),
            ActionName::GetCardsInList => Self::GetCardsInList(typed(document)?),
            ActionName::CreateCard => Self::CreateCard(typed(document)?),
            ActionName::UpdateCard => Self::UpdateCard(typed(document)?),
            ActionName::AddCardComment => Self::AddCardComment(typed(document)?),
            ActionName::MoveCardUp => Self::MoveCardUp(typed(document)?),
            ActionName::MoveCardDown => Self::MoveCardDown(typed(document)?),
            ActionName::MoveCardToList => Self::MoveCardToList(typed(document)?),
        })
    }

    /// Returns the name of the requested action.
    #[must_use]
    pub const fn name(&self) -> ActionName {
        match self {
            Self::GetAllBoards => ActionName::GetAllBoards,
            Self::GetBoardById(_) => ActionName::GetBoardById,
            Self::GetBoardsByDisplayName(_) => ActionName::GetBoardsByDisplayName,
            Self::GetListById(_) => ActionName::GetListById,
            Self::GetListsInBoard(_) => ActionName::GetListsInBoard,
            Self::GetListsByDisplayName(_) => ActionName::GetListsByDisplayName,
            Self::GetBoardMembers(_) => ActionName::GetBoardMembers,
            Self::GetCardMembers(_) => ActionName::GetCardMembers,
            Self::GetMemberByIdOrUsername(_) => ActionName::GetMemberByIdOrUsername,
            Self::GetCardById(_) => ActionName::GetCardById,
            Self::GetCardsByDisplayName(_) => ActionName::GetCardsByDisplayName,
            Self::GetCardsInList(_) => ActionName::GetCardsInList,
            Self::CreateCard(_) => ActionName::CreateCard,
            Self::UpdateCard(_) => ActionName::UpdateCard,
            Self::AddCardComment(_) => ActionName::AddCardComment,
            Self::MoveCardUp(_) => ActionName::MoveCardUp,
            Self::MoveCardDown(_) => ActionName::MoveCardDown,
            Self::MoveCardToList(_) => ActionName::MoveCardToList,
        }
    }
}

fn typed<T: DeserializeOwned>(document: Value) -> Result<T, ValidationError> {
    serde_json::from_value(document).map_err(|error| {
        ValidationError::at_root(ValidationErrorKind::Undecodable(error.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn every_name_parses_back_from_its_wire_form() {
        for name in ActionName::ALL {
            assert_eq!(name.as_str().parse::<ActionName>(), Ok(name));
        }
    }

    #[rstest]
    #[case("deleteBoard")]
    #[case("getcardbyid")]
    #[case("")]
    fn unknown_names_are_rejected(#[case] raw: &str) {
        assert_eq!(
            ActionName::try_from(raw),
            Err(UnknownActionError(raw.to_owned()))
        );
    }

    #[test]
    fn only_idempotent_actions_are_replay_safe() {
        assert!(ReplaySafety::Idempotent.is_replay_safe());
        assert!(!ReplaySafety::NotIdempotent.is_replay_safe());
    }
}
