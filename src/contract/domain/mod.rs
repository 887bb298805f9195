//! Domain model for Trello action contracts.
//!
//! The contract domain holds identifiers, entity read models, declarative
//! schemas, and the typed requests and outputs of every supported action.
//! Nothing in this module performs I/O.

mod actions;
mod entities;
mod error;
pub mod fragments;
mod ids;
mod outputs;
mod requests;
mod schema;

pub use actions::{
    ActionDefinition, ActionName, ActionRequest, ReplaySafety, UnknownActionError,
};
pub use entities::{Board, Card, List, Member};
pub(crate) use entities::{description_kind, due_date_kind, name_kind};
pub use error::{FieldPath, ParseTrelloIdError, ValidationError, ValidationErrorKind};
pub use ids::TrelloId;
pub use outputs::{
    ActionOutput, AddCardCommentOutput, BoardOutput, BoardsOutput, CardOutput, CardsOutput,
    CreateCardOutput, ListOutput, ListsOutput, MemberOutput, MembersOutput, MessageOutput,
};
pub use requests::{
    AddCardCommentInput, BoardIdInput, BoardNameInput, CardIdInput, CardNameInput, ClosedState,
    CompleteState, CreateCardInput, FieldUpdate, ListIdInput, ListNameInput, MemberLookupInput,
    MoveCardDownInput, MoveCardToListInput, MoveCardUpInput, UpdateCardInput,
};
pub use schema::{FieldKind, FieldSchema, ObjectSchema, Presence};
