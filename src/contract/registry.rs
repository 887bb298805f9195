//! Process-wide registry of action contracts.
//!
//! The registry is built once on first access and never mutated afterwards.
//! Contracts are assembled from the shared fragments in
//! [`crate::contract::domain::fragments`].

use super::domain::fragments::{
    has_board_id, has_card_id, has_list_id, has_message, no_input, outputs_board,
    outputs_boards, outputs_card, outputs_cards, outputs_list, outputs_lists, outputs_member,
    outputs_members,
};
use super::domain::{
    ActionDefinition, ActionName, ClosedState, CompleteState, FieldKind, FieldSchema,
    ObjectSchema, description_kind, due_date_kind, name_kind,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static BUILTIN: LazyLock<ActionRegistry> = LazyLock::new(ActionRegistry::build);

/// Immutable map from action name to contract.
#[derive(Debug)]
pub struct ActionRegistry {
    definitions: BTreeMap<ActionName, ActionDefinition>,
}

impl ActionRegistry {
    /// Returns the registry of every supported action.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    fn build() -> Self {
        let definitions = board_actions()
            .into_iter()
            .chain(list_actions())
            .chain(member_actions())
            .chain(card_actions())
            .map(|definition| (definition.name(), definition))
            .collect();
        Self { definitions }
    }

    /// Returns the contract for `name`.
    #[must_use]
    pub fn get(&self, name: ActionName) -> Option<&ActionDefinition> {
        self.definitions.get(&name)
    }

    /// Returns the contract for a wire name, if it is supported.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ActionDefinition> {
        name.parse().ok().and_then(|parsed| self.get(parsed))
    }

    /// Iterates over every contract.
    pub fn list(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.definitions.values()
    }

    /// Returns the number of registered contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Renders every contract keyed by wire name.
    #[must_use]
    pub fn describe(&self) -> Value {
        let described: serde_json::Map<String, Value> = self
            .list()
            .map(|definition| (definition.name().as_str().to_owned(), definition.describe()))
            .collect();
        Value::Object(described)
    }
}

fn board_actions() -> Vec<ActionDefinition> {
    vec![
        ActionDefinition::new(
            ActionName::GetAllBoards,
            "Get all boards",
            "Get all boards the authenticated member can see",
            no_input().describe("Input schema for getting all boards"),
            outputs_boards().describe("Output schema for getting all boards"),
        ),
        ActionDefinition::new(
            ActionName::GetBoardById,
            "Get board by ID",
            "Get a board by its unique identifier",
            has_board_id().describe("Input schema for getting a board from its ID"),
            outputs_board().describe("Output schema for getting a board from its ID"),
        ),
        ActionDefinition::new(
            ActionName::GetBoardsByDisplayName,
            "Find boards by name",
            "Find all boards whose display name matches this name",
            ObjectSchema::new()
                .with_field(
                    FieldSchema::required("boardName", name_kind())
                        .title("Board Name")
                        .describe("Display name of the board"),
                )
                .describe("Input schema for finding boards by name"),
            outputs_boards().describe("Output schema for finding boards by name"),
        ),
    ]
}

fn list_actions() -> Vec<ActionDefinition> {
    vec![
        ActionDefinition::new(
            ActionName::GetListById,
            "Get list by ID",
            "Get a list by its unique identifier",
            has_list_id().describe("Input schema for getting a list from its ID"),
            outputs_list().describe("Output schema for getting a list from its ID"),
        ),
        ActionDefinition::new(
            ActionName::GetListsInBoard,
            "Get lists in board",
            "Get all lists on a board",
            has_board_id().describe("Input schema for getting all lists on a board"),
            outputs_lists().describe("Output schema for getting all lists on a board"),
        ),
        ActionDefinition::new(
            ActionName::GetListsByDisplayName,
            "Find lists by name",
            "Find all lists on a board whose display name matches this name",
            has_board_id()
                .with_field(
                    FieldSchema::required("listName", name_kind())
                        .title("List Name")
                        .describe("Display name of the list"),
                )
                .describe("Input schema for finding lists by name"),
            outputs_lists().describe("Output schema for finding lists by name"),
        ),
    ]
}

fn member_actions() -> Vec<ActionDefinition> {
    vec![
        ActionDefinition::new(
            ActionName::GetBoardMembers,
            "Get board members",
            "Get all members of a board",
            has_board_id().describe("Input schema for getting the members of a board"),
            outputs_members().describe("Output schema for getting the members of a board"),
        ),
        ActionDefinition::new(
            ActionName::GetCardMembers,
            "Get card members",
            "Get all members assigned to a card",
            has_card_id().describe("Input schema for getting the members of a card"),
            outputs_members().describe("Output schema for getting the members of a card"),
        ),
        ActionDefinition::new(
            ActionName::GetMemberByIdOrUsername,
            "Get member by ID or username",
            "Get a member by their unique identifier or username",
            ObjectSchema::new()
                .with_field(
                    FieldSchema::required("memberIdOrUsername", FieldKind::non_empty_text())
                        .title("Member ID or Username")
                        .describe("Unique identifier or username of the member"),
                )
                .describe("Input schema for getting a member"),
            outputs_member().describe("Output schema for getting a member"),
        ),
    ]
}

fn card_actions() -> Vec<ActionDefinition> {
    vec![
        ActionDefinition::new(
            ActionName::GetCardById,
            "Get card by ID",
            "Get a card by its unique identifier",
            has_card_id().describe("Input schema for getting a card from its ID"),
            outputs_card().describe("Output schema for getting a card from its ID"),
        ),
        ActionDefinition::new(
            ActionName::GetCardsByDisplayName,
            "Find cards by name",
            "Find all cards in a list whose display name matches this name",
            has_list_id()
                .with_field(
                    FieldSchema::required("cardName", name_kind())
                        .title("Card Name")
                        .describe("Display name of the card"),
                )
                .describe("Input schema for finding cards by name"),
            outputs_cards().describe("Output schema for finding cards by name"),
        ),
        ActionDefinition::new(
            ActionName::GetCardsInList,
            "Get cards in list",
            "Get all cards in a list",
            has_list_id().describe("Input schema for getting all cards in a list"),
            outputs_cards().describe("Output schema for getting all cards in a list"),
        ),
        ActionDefinition::new(
            ActionName::CreateCard,
            "Create new card",
            "Create a card and add it to a list",
            create_card_input(),
            has_message()
                .with_field(
                    FieldSchema::required("newCardId", FieldKind::Identifier)
                        .describe("Unique identifier of the new card"),
                )
                .describe("Output schema for creating a card"),
        )
        .not_idempotent(),
        ActionDefinition::new(
            ActionName::UpdateCard,
            "Update card",
            "Update the details of a card",
            update_card_input(),
            has_message().describe("Output schema for updating a card"),
        ),
        ActionDefinition::new(
            ActionName::AddCardComment,
            "Add card comment",
            "Add a new comment to a card",
            ObjectSchema::new()
                .with_field(
                    FieldSchema::required("cardId", FieldKind::Identifier)
                        .title("Card ID")
                        .describe("Unique identifier of the card to which a comment will be added"),
                )
                .with_field(
                    FieldSchema::required("commentBody", FieldKind::text())
                        .title("Comment Body")
                        .describe("The body text of the comment"),
                )
                .describe("Input schema for adding a comment to a card"),
            has_message()
                .with_field(
                    FieldSchema::required("newCommentId", FieldKind::Identifier)
                        .describe("Unique identifier of the newly created comment"),
                )
                .describe("Output schema for adding a comment to a card"),
        )
        .not_idempotent(),
        ActionDefinition::new(
            ActionName::MoveCardUp,
            "Move card up",
            "Move a card n spaces up",
            has_card_id()
                .with_field(move_distance(
                    "moveUpByNSpaces",
                    "Move Up By N Spaces",
                    "Number of spaces by which to move the card up",
                ))
                .describe("Input schema for moving a card up"),
            has_message().describe("Output schema for moving a card up"),
        )
        .not_idempotent(),
        ActionDefinition::new(
            ActionName::MoveCardDown,
            "Move card down",
            "Move a card n spaces down",
            has_card_id()
                .with_field(move_distance(
                    "moveDownByNSpaces",
                    "Move Down By N Spaces",
                    "Number of spaces by which to move the card down",
                ))
                .describe("Input schema for moving a card down"),
            has_message().describe("Output schema for moving a card down"),
        )
        .not_idempotent(),
        ActionDefinition::new(
            ActionName::MoveCardToList,
            "Move card to another list",
            "Move a card to another list within the same board",
            has_card_id()
                .with_field(
                    FieldSchema::required("newListId", FieldKind::Identifier)
                        .title("New List ID")
                        .describe("Unique identifier of the list in which the card will be moved"),
                )
                .describe("Input schema for moving a card to a list"),
            has_message().describe("Output schema for moving a card to a list"),
        ),
    ]
}

fn create_card_input() -> ObjectSchema {
    ObjectSchema::new()
        .with_field(
            FieldSchema::required("listId", FieldKind::Identifier)
                .title("List ID")
                .describe("ID of the list in which to insert the new card"),
        )
        .with_field(
            FieldSchema::required("cardName", name_kind())
                .title("Card Name")
                .describe("Name of the new card"),
        )
        .with_field(
            FieldSchema::optional("cardBody", description_kind())
                .title("Card Body")
                .describe("Body text of the new card"),
        )
        .with_field(
            FieldSchema::optional("members", FieldKind::identifiers())
                .title("Members")
                .describe("Members to add to the card. This should be a list of member IDs."),
        )
        .with_field(
            FieldSchema::optional("labels", FieldKind::identifiers())
                .title("Labels")
                .describe("Labels to add to the card. This should be a list of label IDs."),
        )
        .with_field(
            FieldSchema::optional("dueDate", due_date_kind())
                .title("Due Date")
                .describe("The due date of the card in ISO 8601 format"),
        )
        .describe("Input schema for creating a new card")
}

fn update_card_input() -> ObjectSchema {
    has_card_id()
        .with_field(
            FieldSchema::optional("name", name_kind())
                .title("Name")
                .describe("The name of the card. Omit to keep the current name."),
        )
        .with_field(
            FieldSchema::optional("bodyText", description_kind())
                .title("Body Text")
                .describe("Body text of the card. Omit to keep the current body."),
        )
        .with_field(
            FieldSchema::optional("closedState", FieldKind::Enumeration(ClosedState::LITERALS))
                .title("Closed State")
                .describe("Whether the card should be archived. Omit to keep the current status."),
        )
        .with_field(
            FieldSchema::optional(
                "completeState",
                FieldKind::Enumeration(CompleteState::LITERALS),
            )
            .title("State Completion")
            .describe(
                "Whether the card should be marked as complete. Omit to keep the current status.",
            ),
        )
        .with_field(relation_change(
            "membersToAdd",
            "Members to Add",
            "Members to add to the card. This should be a list of member IDs.",
        ))
        .with_field(relation_change(
            "membersToRemove",
            "Members to Remove",
            "Members to remove from the card. This should be a list of member IDs.",
        ))
        .with_field(relation_change(
            "labelsToAdd",
            "Labels to Add",
            "Labels to add to the card. This should be a list of label IDs.",
        ))
        .with_field(relation_change(
            "labelsToRemove",
            "Labels to Remove",
            "Labels to remove from the card. This should be a list of label IDs.",
        ))
        .with_field(
            FieldSchema::optional("dueDate", due_date_kind().nullable())
                .title("Due Date")
                .describe(
                    "The due date of the card in ISO 8601 format. Omit to keep the current \
                     due date, or pass null to remove it.",
                ),
        )
        .disjoint("membersToAdd", "membersToRemove")
        .disjoint("labelsToAdd", "labelsToRemove")
        .describe("Input schema for updating a card")
}

fn relation_change(name: &str, title: &str, description: &str) -> FieldSchema {
    FieldSchema::optional(name, FieldKind::identifiers())
        .title(title)
        .describe(description)
}

fn move_distance(name: &str, title: &str, description: &str) -> FieldSchema {
    FieldSchema::defaulted(name, FieldKind::Integer { minimum: Some(1) }, json!(1))
        .title(title)
        .describe(description)
}
