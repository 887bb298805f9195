//! In-memory Trello gateway for dispatch tests and local flows.

use crate::contract::domain::{Board, Card, FieldUpdate, List, Member, TrelloId};
use crate::dispatch::ports::{CardFieldChanges, NewCard, TrelloGateway};
use crate::remote::{RemoteFailureKind, RemoteResult, RemoteServiceError, mint_remote_id};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Gateway operation names used for failure injection and call journals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    /// [`TrelloGateway::list_boards`]
    ListBoards,
    /// [`TrelloGateway::get_board`]
    GetBoard,
    /// [`TrelloGateway::get_list`]
    GetList,
    /// [`TrelloGateway::lists_in_board`]
    ListsInBoard,
    /// [`TrelloGateway::board_members`]
    BoardMembers,
    /// [`TrelloGateway::card_members`]
    CardMembers,
    /// [`TrelloGateway::get_member`]
    GetMember,
    /// [`TrelloGateway::get_card`]
    GetCard,
    /// [`TrelloGateway::cards_in_list`]
    CardsInList,
    /// [`TrelloGateway::create_card`]
    CreateCard,
    /// [`TrelloGateway::update_card_fields`]
    UpdateCardFields,
    /// [`TrelloGateway::add_card_member`]
    AddCardMember,
    /// [`TrelloGateway::remove_card_member`]
    RemoveCardMember,
    /// [`TrelloGateway::add_card_label`]
    AddCardLabel,
    /// [`TrelloGateway::remove_card_label`]
    RemoveCardLabel,
    /// [`TrelloGateway::add_comment`]
    AddComment,
    /// [`TrelloGateway::move_card_to_position`]
    MoveCardToPosition,
    /// [`TrelloGateway::move_card_to_list`]
    MoveCardToList,
}

impl GatewayOperation {
    /// Returns the operation name reported in remote errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListBoards => "list_boards",
            Self::GetBoard => "get_board",
            Self::GetList => "get_list",
            Self::ListsInBoard => "lists_in_board",
            Self::BoardMembers => "board_members",
            Self::CardMembers => "card_members",
            Self::GetMember => "get_member",
            Self::GetCard => "get_card",
            Self::CardsInList => "cards_in_list",
            Self::CreateCard => "create_card",
            Self::UpdateCardFields => "update_card_fields",
            Self::AddCardMember => "add_card_member",
            Self::RemoveCardMember => "remove_card_member",
            Self::AddCardLabel => "add_card_label",
            Self::RemoveCardLabel => "remove_card_label",
            Self::AddComment => "add_comment",
            Self::MoveCardToPosition => "move_card_to_position",
            Self::MoveCardToList => "move_card_to_list",
        }
    }

    const fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::CreateCard
                | Self::UpdateCardFields
                | Self::AddCardMember
                | Self::RemoveCardMember
                | Self::AddCardLabel
                | Self::RemoveCardLabel
                | Self::AddComment
                | Self::MoveCardToPosition
                | Self::MoveCardToList
        )
    }
}

/// A comment stored by the in-memory gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredComment {
    /// Comment identifier.
    pub id: TrelloId,
    /// Card the comment belongs to.
    pub card_id: TrelloId,
    /// Comment text.
    pub text: String,
}

/// Thread-safe in-memory model of a Trello workspace.
///
/// The adapter keeps list order, supports seeding helpers for tests, and
/// can be told to fail upcoming calls of a given operation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrelloGateway {
    state: Arc<RwLock<GatewayState>>,
}

#[derive(Debug, Default)]
struct GatewayState {
    boards: BTreeMap<TrelloId, Board>,
    lists: BTreeMap<TrelloId, List>,
    list_order: HashMap<TrelloId, Vec<TrelloId>>,
    cards: HashMap<TrelloId, Card>,
    card_order: HashMap<TrelloId, Vec<TrelloId>>,
    members: BTreeMap<TrelloId, Member>,
    board_members: HashMap<TrelloId, Vec<TrelloId>>,
    comments: Vec<StoredComment>,
    failures: HashMap<GatewayOperation, VecDeque<RemoteServiceError>>,
    mutations: Vec<GatewayOperation>,
}

impl GatewayState {
    fn take_failure(&mut self, operation: GatewayOperation) -> RemoteResult<()> {
        self.failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
            .map_or(Ok(()), Err)
    }

    fn card(&self, operation: GatewayOperation, card_id: &TrelloId) -> RemoteResult<&Card> {
        self.cards
            .get(card_id)
            .ok_or_else(|| missing(operation, "card", card_id))
    }

    fn card_mut(
        &mut self,
        operation: GatewayOperation,
        card_id: &TrelloId,
    ) -> RemoteResult<&mut Card> {
        self.cards
            .get_mut(card_id)
            .ok_or_else(|| missing(operation, "card", card_id))
    }

    fn list(&self, operation: GatewayOperation, list_id: &TrelloId) -> RemoteResult<&List> {
        self.lists
            .get(list_id)
            .ok_or_else(|| missing(operation, "list", list_id))
    }

    fn ensure_board(&self, operation: GatewayOperation, board_id: &TrelloId) -> RemoteResult<()> {
        if self.boards.contains_key(board_id) {
            Ok(())
        } else {
            Err(missing(operation, "board", board_id))
        }
    }

    fn members_by_id(&self, ids: &[TrelloId]) -> Vec<Member> {
        ids.iter()
            .filter_map(|id| self.members.get(id).cloned())
            .collect()
    }

    fn insert_card(
        &mut self,
        operation: GatewayOperation,
        new_card: &NewCard,
    ) -> RemoteResult<Card> {
        self.list(operation, &new_card.list_id)?;
        let card = Card {
            id: mint_id(operation)?,
            name: new_card.name.clone(),
            description: new_card.description.clone(),
            list_id: new_card.list_id.clone(),
            is_closed: false,
            is_completed: false,
            due_date: new_card.due_date,
            members: new_card.members.clone(),
            labels: new_card.labels.clone(),
        };
        self.card_order
            .entry(card.list_id.clone())
            .or_default()
            .push(card.id.clone());
        self.cards.insert(card.id.clone(), card.clone());
        Ok(card)
    }

    fn detach_from_list(&mut self, card: &Card) {
        if let Some(order) = self.card_order.get_mut(&card.list_id) {
            order.retain(|id| *id != card.id);
        }
    }
}

fn missing(operation: GatewayOperation, kind: &str, id: &TrelloId) -> RemoteServiceError {
    RemoteServiceError::not_found(operation.as_str(), format!("{kind} {id} does not exist"))
}

fn mint_id(operation: GatewayOperation) -> RemoteResult<TrelloId> {
    mint_remote_id(operation.as_str())
}

fn apply_field_changes(card: &mut Card, changes: &CardFieldChanges) {
    if let Some(name) = &changes.name {
        card.name.clone_from(name);
    }
    if let Some(description) = &changes.description {
        card.description = Some(description.clone());
    }
    if let Some(closed) = changes.closed {
        card.is_closed = closed;
    }
    if let Some(completed) = changes.completed {
        card.is_completed = completed;
    }
    match changes.due_date {
        FieldUpdate::Keep => {}
        FieldUpdate::Set(due) => card.due_date = Some(due),
        FieldUpdate::Clear => card.due_date = None,
    }
}

impl InMemoryTrelloGateway {
    /// Creates an empty in-memory workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
        operation: GatewayOperation,
    ) -> RemoteResult<RwLockReadGuard<'_, GatewayState>> {
        self.state
            .read()
            .map_err(|err| RemoteServiceError::internal(operation.as_str(), &err))
    }

    fn write(
        &self,
        operation: GatewayOperation,
    ) -> RemoteResult<RwLockWriteGuard<'_, GatewayState>> {
        self.state
            .write()
            .map_err(|err| RemoteServiceError::internal(operation.as_str(), &err))
    }

    /// Opens a call: journals mutations and consumes any injected failure.
    fn begin(
        &self,
        operation: GatewayOperation,
    ) -> RemoteResult<RwLockWriteGuard<'_, GatewayState>> {
        let mut state = self.write(operation)?;
        if operation.is_mutation() {
            state.mutations.push(operation);
        }
        state.take_failure(operation)?;
        Ok(state)
    }

    /// Makes the next call of `operation` fail with `error`.
    ///
    /// Several failures queue up and are consumed in order.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn fail_next(
        &self,
        operation: GatewayOperation,
        error: RemoteServiceError,
    ) -> RemoteResult<()> {
        let mut state = self.write(operation)?;
        state.failures.entry(operation).or_default().push_back(error);
        Ok(())
    }

    /// Makes the next call of `operation` fail with a failure of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn fail_next_with(
        &self,
        operation: GatewayOperation,
        kind: RemoteFailureKind,
    ) -> RemoteResult<()> {
        self.fail_next(
            operation,
            RemoteServiceError::new(operation.as_str(), kind, "injected failure"),
        )
    }

    /// Returns every mutating call attempted so far, in order.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn mutations(&self) -> RemoteResult<Vec<GatewayOperation>> {
        Ok(self.read(GatewayOperation::ListBoards)?.mutations.clone())
    }

    /// Adds a board.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn seed_board(&self, name: impl Into<String>) -> RemoteResult<Board> {
        let operation = GatewayOperation::GetBoard;
        let mut state = self.write(operation)?;
        let board = Board {
            id: mint_id(operation)?,
            name: name.into(),
            description: None,
            is_closed: false,
        };
        state.boards.insert(board.id.clone(), board.clone());
        Ok(board)
    }

    /// Adds a list at the end of a board.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the board does not exist.
    pub fn seed_list(&self, board_id: &TrelloId, name: impl Into<String>) -> RemoteResult<List> {
        let operation = GatewayOperation::GetList;
        let mut state = self.write(operation)?;
        state.ensure_board(operation, board_id)?;
        let list = List {
            id: mint_id(operation)?,
            name: name.into(),
            board_id: board_id.clone(),
            is_closed: false,
        };
        state
            .list_order
            .entry(board_id.clone())
            .or_default()
            .push(list.id.clone());
        state.lists.insert(list.id.clone(), list.clone());
        Ok(list)
    }

    /// Adds a card at the end of a list without journaling a mutation.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the list does not exist.
    pub fn seed_card(&self, list_id: &TrelloId, name: impl Into<String>) -> RemoteResult<Card> {
        let operation = GatewayOperation::CreateCard;
        let new_card = NewCard {
            list_id: list_id.clone(),
            name: name.into(),
            description: None,
            members: Vec::new(),
            labels: Vec::new(),
            due_date: None,
        };
        self.write(operation)?.insert_card(operation, &new_card)
    }

    /// Adds a member to a board.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the board does not exist.
    pub fn seed_member(
        &self,
        board_id: &TrelloId,
        name: impl Into<String>,
        username: impl Into<String>,
    ) -> RemoteResult<Member> {
        let operation = GatewayOperation::GetMember;
        let mut state = self.write(operation)?;
        state.ensure_board(operation, board_id)?;
        let member = Member {
            id: mint_id(operation)?,
            name: name.into(),
            username: username.into(),
        };
        state
            .board_members
            .entry(board_id.clone())
            .or_default()
            .push(member.id.clone());
        state.members.insert(member.id.clone(), member.clone());
        Ok(member)
    }

    /// Returns the stored card, if any.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn card(&self, card_id: &TrelloId) -> RemoteResult<Option<Card>> {
        Ok(self.read(GatewayOperation::GetCard)?.cards.get(card_id).cloned())
    }

    /// Returns the comments stored for a card in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an internal remote error when lock acquisition fails.
    pub fn comments(&self, card_id: &TrelloId) -> RemoteResult<Vec<StoredComment>> {
        Ok(self
            .read(GatewayOperation::AddComment)?
            .comments
            .iter()
            .filter(|comment| comment.card_id == *card_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TrelloGateway for InMemoryTrelloGateway {
    async fn list_boards(&self) -> RemoteResult<Vec<Board>> {
        let state = self.begin(GatewayOperation::ListBoards)?;
        Ok(state.boards.values().cloned().collect())
    }

    async fn get_board(&self, board_id: &TrelloId) -> RemoteResult<Board> {
        let operation = GatewayOperation::GetBoard;
        let state = self.begin(operation)?;
        state
            .boards
            .get(board_id)
            .cloned()
            .ok_or_else(|| missing(operation, "board", board_id))
    }

    async fn get_list(&self, list_id: &TrelloId) -> RemoteResult<List> {
        let operation = GatewayOperation::GetList;
        let state = self.begin(operation)?;
        state.list(operation, list_id).cloned()
    }

    async fn lists_in_board(&self, board_id: &TrelloId) -> RemoteResult<Vec<List>> {
        let operation = GatewayOperation::ListsInBoard;
        let state = self.begin(operation)?;
        state.ensure_board(operation, board_id)?;
        Ok(state
            .list_order
            .get(board_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.lists.get(id).cloned())
            .collect())
    }

    async fn board_members(&self, board_id: &TrelloId) -> RemoteResult<Vec<Member>> {
        let operation = GatewayOperation::BoardMembers;
        let state = self.begin(operation)?;
        state.ensure_board(operation, board_id)?;
        let ids = state.board_members.get(board_id).cloned().unwrap_or_default();
        Ok(state.members_by_id(&ids))
    }

    async fn card_members(&self, card_id: &TrelloId) -> RemoteResult<Vec<Member>> {
        let operation = GatewayOperation::CardMembers;
        let state = self.begin(operation)?;
        let card = state.card(operation, card_id)?;
        Ok(state.members_by_id(&card.members))
    }

    async fn get_member(&self, id_or_username: &str) -> RemoteResult<Member> {
        let operation = GatewayOperation::GetMember;
        let state = self.begin(operation)?;
        state
            .members
            .values()
            .find(|member| {
                member.id.as_str() == id_or_username || member.username == id_or_username
            })
            .cloned()
            .ok_or_else(|| {
                RemoteServiceError::not_found(
                    operation.as_str(),
                    format!("member {id_or_username} does not exist"),
                )
            })
    }

    async fn get_card(&self, card_id: &TrelloId) -> RemoteResult<Card> {
        let operation = GatewayOperation::GetCard;
        let state = self.begin(operation)?;
        state.card(operation, card_id).cloned()
    }

    async fn cards_in_list(&self, list_id: &TrelloId) -> RemoteResult<Vec<Card>> {
        let operation = GatewayOperation::CardsInList;
        let state = self.begin(operation)?;
        state.list(operation, list_id)?;
        Ok(state
            .card_order
            .get(list_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.cards.get(id).cloned())
            .collect())
    }

    async fn create_card(&self, card: &NewCard) -> RemoteResult<Card> {
        let operation = GatewayOperation::CreateCard;
        self.begin(operation)?.insert_card(operation, card)
    }

    async fn update_card_fields(
        &self,
        card_id: &TrelloId,
        changes: &CardFieldChanges,
    ) -> RemoteResult<()> {
        let operation = GatewayOperation::UpdateCardFields;
        let mut state = self.begin(operation)?;
        apply_field_changes(state.card_mut(operation, card_id)?, changes);
        Ok(())
    }

    async fn add_card_member(&self, card_id: &TrelloId, member_id: &TrelloId) -> RemoteResult<()> {
        let operation = GatewayOperation::AddCardMember;
        let mut state = self.begin(operation)?;
        let card = state.card_mut(operation, card_id)?;
        if !card.members.contains(member_id) {
            card.members.push(member_id.clone());
        }
        Ok(())
    }

    async fn remove_card_member(
        &self,
        card_id: &TrelloId,
        member_id: &TrelloId,
    ) -> RemoteResult<()> {
        let operation = GatewayOperation::RemoveCardMember;
        let mut state = self.begin(operation)?;
        state
            .card_mut(operation, card_id)?
            .members
            .retain(|id| id != member_id);
        Ok(())
    }

    async fn add_card_label(&self, card_id: &TrelloId, label_id: &TrelloId) -> RemoteResult<()> {
        let operation = GatewayOperation::AddCardLabel;
        let mut state = self.begin(operation)?;
        let card = state.card_mut(operation, card_id)?;
        if !card.labels.contains(label_id) {
            card.labels.push(label_id.clone());
        }
        Ok(())
    }

    async fn remove_card_label(
        &self,
        card_id: &TrelloId,
        label_id: &TrelloId,
    ) -> RemoteResult<()> {
        let operation = GatewayOperation::RemoveCardLabel;
        let mut state = self.begin(operation)?;
        state
            .card_mut(operation, card_id)?
            .labels
            .retain(|id| id != label_id);
        Ok(())
    }

    async fn add_comment(&self, card_id: &TrelloId, text: &str) -> RemoteResult<TrelloId> {
        let operation = GatewayOperation::AddComment;
        let mut state = self.begin(operation)?;
        state.card(operation, card_id)?;
        let comment = StoredComment {
            id: mint_id(operation)?,
            card_id: card_id.clone(),
            text: text.to_owned(),
        };
        let comment_id = comment.id.clone();
        state.comments.push(comment);
        Ok(comment_id)
    }

    async fn move_card_to_position(
        &self,
        card_id: &TrelloId,
        position: usize,
    ) -> RemoteResult<()> {
        let operation = GatewayOperation::MoveCardToPosition;
        let mut state = self.begin(operation)?;
        let card = state.card(operation, card_id)?.clone();
        let order = state.card_order.entry(card.list_id.clone()).or_default();
        if position >= order.len() {
            return Err(RemoteServiceError::new(
                operation.as_str(),
                RemoteFailureKind::Rejected,
                format!("position {position} is outside the list"),
            ));
        }
        order.retain(|id| *id != card.id);
        order.insert(position, card.id);
        Ok(())
    }

    async fn move_card_to_list(&self, card_id: &TrelloId, list_id: &TrelloId) -> RemoteResult<()> {
        let operation = GatewayOperation::MoveCardToList;
        let mut state = self.begin(operation)?;
        state.list(operation, list_id)?;
        let card = state.card(operation, card_id)?.clone();
        state.detach_from_list(&card);
        state
            .card_order
            .entry(list_id.clone())
            .or_default()
            .push(card.id.clone());
        state.card_mut(operation, card_id)?.list_id = list_id.clone();
        Ok(())
    }
}
