//! Reusable input and output schema fragments.
//!
//! Concrete action contracts are built by extending these fragments so that
//! equivalent fields are declared exactly once.

use super::{Board, Card, FieldKind, FieldSchema, List, Member, ObjectSchema};

/// Contract without input fields.
#[must_use]
pub fn no_input() -> ObjectSchema {
    ObjectSchema::new()
}

/// Input carrying the identifier of a board.
#[must_use]
pub fn has_board_id() -> ObjectSchema {
    ObjectSchema::new().with_field(
        FieldSchema::required("boardId", FieldKind::Identifier)
            .title("Board ID")
            .describe("Unique identifier of the board"),
    )
}

/// Input carrying the identifier of a list.
#[must_use]
pub fn has_list_id() -> ObjectSchema {
    ObjectSchema::new().with_field(
        FieldSchema::required("listId", FieldKind::Identifier)
            .title("List ID")
            .describe("Unique identifier of the list"),
    )
}

/// Input carrying the identifier of a card.
#[must_use]
pub fn has_card_id() -> ObjectSchema {
    ObjectSchema::new().with_field(
        FieldSchema::required("cardId", FieldKind::Identifier)
            .title("Card ID")
            .describe("Unique identifier of the card"),
    )
}

/// Output carrying a human-readable outcome message.
#[must_use]
pub fn has_message() -> ObjectSchema {
    ObjectSchema::new()
        .with_field(FieldSchema::required("message", FieldKind::text()).describe("Output message"))
}

/// Output carrying one member.
#[must_use]
pub fn outputs_member() -> ObjectSchema {
    single("member", Member::schema(), "The member object")
}

/// Output carrying several members.
#[must_use]
pub fn outputs_members() -> ObjectSchema {
    many("members", Member::schema(), "Array of member objects")
}

/// Output carrying one card.
#[must_use]
pub fn outputs_card() -> ObjectSchema {
    single("card", Card::schema(), "The card object")
}

/// Output carrying several cards.
#[must_use]
pub fn outputs_cards() -> ObjectSchema {
    many("cards", Card::schema(), "Array of card objects")
}

/// Output carrying one list.
#[must_use]
pub fn outputs_list() -> ObjectSchema {
    single("list", List::schema(), "The list object")
}

/// Output carrying several lists.
#[must_use]
pub fn outputs_lists() -> ObjectSchema {
    many("lists", List::schema(), "Array of list objects")
}

/// Output carrying one board.
#[must_use]
pub fn outputs_board() -> ObjectSchema {
    single("board", Board::schema(), "The board object")
}

/// Output carrying several boards.
#[must_use]
pub fn outputs_boards() -> ObjectSchema {
    many("boards", Board::schema(), "Array of board objects")
}

fn single(name: &str, entity: ObjectSchema, description: &str) -> ObjectSchema {
    ObjectSchema::new()
        .with_field(FieldSchema::required(name, FieldKind::object(entity)).describe(description))
}

fn many(name: &str, entity: ObjectSchema, description: &str) -> ObjectSchema {
    ObjectSchema::new()
        .with_field(FieldSchema::required(name, FieldKind::objects(entity)).describe(description))
}
