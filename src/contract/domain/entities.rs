//! Read models for the four Trello entity kinds.
//!
//! Entities are never mutated locally: every change is a request to the
//! remote service and the local copy is discarded once the action completes.
//! Each entity pairs a `serde` representation with the declarative schema
//! that output contracts embed.

use super::{FieldKind, FieldSchema, ObjectSchema, TrelloId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shape of every entity display name.
pub(crate) const fn name_kind() -> FieldKind {
    FieldKind::non_empty_text()
}

/// Shape of free-form descriptions.
pub(crate) const fn description_kind() -> FieldKind {
    FieldKind::text()
}

/// Shape of card due dates.
pub(crate) const fn due_date_kind() -> FieldKind {
    FieldKind::DateTime
}

/// A Trello board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Board {
    /// Board identifier.
    pub id: TrelloId,
    /// Display name.
    pub name: String,
    /// Board description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the board is closed.
    pub is_closed: bool,
}

impl Board {
    /// Returns the declarative board schema.
    #[must_use]
    pub fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .with_field(
                FieldSchema::required("id", FieldKind::Identifier)
                    .describe("Unique identifier of the board"),
            )
            .with_field(FieldSchema::required("name", name_kind()).describe("Name of the board"))
            .with_field(
                FieldSchema::optional("description", description_kind())
                    .describe("Description of the board"),
            )
            .with_field(
                FieldSchema::required("isClosed", FieldKind::Boolean)
                    .describe("Whether the board is closed"),
            )
            .describe("A Trello board")
    }
}

/// A list on a Trello board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct List {
    /// List identifier.
    pub id: TrelloId,
    /// Display name.
    pub name: String,
    /// Board containing the list.
    pub board_id: TrelloId,
    /// Whether the list is archived.
    pub is_closed: bool,
}

impl List {
    /// Returns the declarative list schema.
    #[must_use]
    pub fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .with_field(
                FieldSchema::required("id", FieldKind::Identifier)
                    .describe("Unique identifier of the list"),
            )
            .with_field(FieldSchema::required("name", name_kind()).describe("Name of the list"))
            .with_field(
                FieldSchema::required("boardId", FieldKind::Identifier)
                    .describe("Unique identifier of the board containing the list"),
            )
            .with_field(
                FieldSchema::required("isClosed", FieldKind::Boolean)
                    .describe("Whether the list is archived"),
            )
            .describe("A list on a Trello board")
    }
}

/// A card in a Trello list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Card {
    /// Card identifier.
    pub id: TrelloId,
    /// Display name.
    pub name: String,
    /// Body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// List containing the card.
    pub list_id: TrelloId,
    /// Whether the card is archived.
    pub is_closed: bool,
    /// Whether the card is marked complete.
    pub is_completed: bool,
    /// Due date, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Member identifiers assigned to the card.
    #[serde(default)]
    pub members: Vec<TrelloId>,
    /// Label identifiers attached to the card.
    #[serde(default)]
    pub labels: Vec<TrelloId>,
}

impl Card {
    /// Returns the declarative card schema.
    #[must_use]
    pub fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .with_field(
                FieldSchema::required("id", FieldKind::Identifier)
                    .describe("Unique identifier of the card"),
            )
            .with_field(FieldSchema::required("name", name_kind()).describe("Name of the card"))
            .with_field(
                FieldSchema::optional("description", description_kind())
                    .describe("Body text of the card"),
            )
            .with_field(
                FieldSchema::required("listId", FieldKind::Identifier)
                    .describe("Unique identifier of the list containing the card"),
            )
            .with_field(
                FieldSchema::required("isClosed", FieldKind::Boolean)
                    .describe("Whether the card is archived"),
            )
            .with_field(
                FieldSchema::required("isCompleted", FieldKind::Boolean)
                    .describe("Whether the card is marked as complete"),
            )
            .with_field(
                FieldSchema::optional("dueDate", due_date_kind())
                    .describe("Due date of the card in ISO 8601 format"),
            )
            .with_field(
                FieldSchema::required("members", FieldKind::identifiers())
                    .describe("Members assigned to the card"),
            )
            .with_field(
                FieldSchema::required("labels", FieldKind::identifiers())
                    .describe("Labels attached to the card"),
            )
            .describe("A card in a Trello list")
    }
}

/// A Trello member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Member {
    /// Member identifier.
    pub id: TrelloId,
    /// Display name.
    pub name: String,
    /// Unique username.
    pub username: String,
}

impl Member {
    /// Returns the declarative member schema.
    #[must_use]
    pub fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .with_field(
                FieldSchema::required("id", FieldKind::Identifier)
                    .describe("Unique identifier of the member"),
            )
            .with_field(
                FieldSchema::required("name", name_kind())
                    .describe("Full name of the member"),
            )
            .with_field(
                FieldSchema::required("username", FieldKind::non_empty_text())
                    .describe("Username of the member"),
            )
            .describe("A Trello member")
    }
}
