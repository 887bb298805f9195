//! Service layer dispatching validated actions to the remote service.
//!
//! Provides [`ActionDispatchService`], which validates caller input against
//! the action contract, performs the remote calls, and validates the output
//! before surfacing it.

use super::card_update::{CardUpdateFailure, CardUpdatePlan};
use super::retry::RetryPolicy;
use crate::contract::ActionRegistry;
use crate::contract::domain::{
    ActionDefinition, ActionName, ActionOutput, ActionRequest, AddCardCommentInput,
    AddCardCommentOutput, BoardOutput, BoardsOutput, CardOutput, CardsOutput, CreateCardInput,
    CreateCardOutput, ListOutput, ListsOutput, MemberOutput, MembersOutput, MoveCardToListInput,
    ReplaySafety, TrelloId, UnknownActionError, UpdateCardInput, ValidationError,
};
use crate::dispatch::ports::{NewCard, TrelloGateway};
use crate::remote::RemoteServiceError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Direction of a relative card move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the top of the list.
    Up,
    /// Towards the bottom of the list.
    Down,
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

/// Service-level errors for action dispatch.
#[derive(Debug, Error)]
pub enum ActionDispatchError {
    /// The action name is not registered.
    #[error(transparent)]
    UnknownAction(#[from] UnknownActionError),

    /// Caller input violates the input contract. No remote call was made.
    #[error("invalid input for {action}: {source}")]
    InvalidInput {
        /// Action being dispatched.
        action: ActionName,
        /// Validation failure.
        source: ValidationError,
    },

    /// The produced output violates the output contract.
    #[error("invalid output from {action}: {source}")]
    InvalidOutput {
        /// Action being dispatched.
        action: ActionName,
        /// Validation failure.
        source: ValidationError,
    },

    /// A remote call failed.
    #[error("{action} failed: {source}")]
    Remote {
        /// Action being dispatched.
        action: ActionName,
        /// Replay classification of the action.
        replay: ReplaySafety,
        /// Remote failure.
        source: RemoteServiceError,
    },

    /// A relative move would leave the bounds of the list.
    #[error(
        "cannot move card {card_id} {direction} by {spaces}: it is at position {position} of {len}"
    )]
    MoveOutOfBounds {
        /// Card being moved.
        card_id: TrelloId,
        /// Requested direction.
        direction: MoveDirection,
        /// Requested distance.
        spaces: usize,
        /// Zero-based current position.
        position: usize,
        /// Number of cards in the list.
        len: usize,
    },

    /// The destination list belongs to a different board.
    #[error("list {list_id} is not on the board of card {card_id}")]
    CrossBoardMove {
        /// Card being moved.
        card_id: TrelloId,
        /// Requested destination list.
        list_id: TrelloId,
    },

    /// The card was not found in the listing of its own list.
    #[error("card {card_id} is missing from list {list_id}")]
    CardNotInList {
        /// Card being moved.
        card_id: TrelloId,
        /// List the card reports as its parent.
        list_id: TrelloId,
    },

    /// An update failed and reverting its applied changes also failed.
    #[error("update of card {card_id} failed ({cause}) and rollback failed ({rollback})")]
    RollbackFailed {
        /// Card being updated.
        card_id: TrelloId,
        /// The failure that triggered the rollback.
        cause: Box<RemoteServiceError>,
        /// The failure that interrupted the rollback.
        rollback: Box<RemoteServiceError>,
    },
}

impl ActionDispatchError {
    /// Returns whether repeating the call may succeed without changing the
    /// outcome.
    ///
    /// Only transient remote failures of replay-safe actions qualify.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Remote { replay, source, .. } => {
                replay.is_replay_safe() && source.is_transient()
            }
            _ => false,
        }
    }

    /// Returns the remote failure that caused this error, if any.
    #[must_use]
    pub fn remote_failure(&self) -> Option<&RemoteServiceError> {
        match self {
            Self::Remote { source, .. } => Some(source),
            Self::RollbackFailed { cause, .. } => Some(&**cause),
            _ => None,
        }
    }
}

/// Result type for action dispatch.
pub type ActionDispatchResult<T> = Result<T, ActionDispatchError>;

fn remote(definition: &ActionDefinition) -> impl FnOnce(RemoteServiceError) -> ActionDispatchError {
    let action = definition.name();
    let replay = definition.replay();
    move |source| ActionDispatchError::Remote {
        action,
        replay,
        source,
    }
}

/// Action dispatch orchestration service.
#[derive(Clone)]
pub struct ActionDispatchService<G>
where
    G: TrelloGateway,
{
    gateway: Arc<G>,
    registry: &'static ActionRegistry,
}

impl<G> ActionDispatchService<G>
where
    G: TrelloGateway,
{
    /// Creates a dispatcher over the built-in action registry.
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            registry: ActionRegistry::builtin(),
        }
    }

    /// Returns the action registry used for validation.
    #[must_use]
    pub const fn registry(&self) -> &'static ActionRegistry {
        self.registry
    }

    /// Validates `input`, performs the action, and returns the validated
    /// output document.
    ///
    /// # Errors
    ///
    /// Returns [`ActionDispatchError::UnknownAction`] for unregistered names,
    /// [`ActionDispatchError::InvalidInput`] before any remote call when the
    /// input violates the contract, and remote or consistency errors raised
    /// while performing the action.
    pub async fn dispatch(&self, name: &str, input: &Value) -> ActionDispatchResult<Value> {
        let definition = self
            .registry
            .find(name)
            .ok_or_else(|| UnknownActionError(name.to_owned()))?;
        let action = definition.name();

        let request = definition.validate_input(input).map_err(|source| {
            debug!(%action, error = %source, "action input rejected");
            ActionDispatchError::InvalidInput { action, source }
        })?;
        debug!(%action, "action input validated");

        let output = self.perform(definition, request).await?;

        definition
            .validate_output(&output)
            .map_err(|source| ActionDispatchError::InvalidOutput { action, source })
    }

    /// Dispatches an action, retrying retryable failures with backoff.
    ///
    /// Actions that are not replay-safe are attempted exactly once.
    ///
    /// # Errors
    ///
    /// Returns the last error once it is not retryable or the policy is
    /// exhausted.
    pub async fn dispatch_with_retry(
        &self,
        name: &str,
        input: &Value,
        policy: &RetryPolicy,
    ) -> ActionDispatchResult<Value> {
        let mut attempt = 0;
        loop {
            match self.dispatch(name, input).await {
                Ok(output) => return Ok(output),
                Err(error) if error.is_retryable() && attempt < policy.max_retries() => {
                    let delay = error
                        .remote_failure()
                        .and_then(RemoteServiceError::retry_after)
                        .unwrap_or_else(|| policy.delay_for_attempt(attempt));
                    warn!(
                        action = name,
                        attempt = attempt + 1,
                        max = policy.max_retries(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "retrying action after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn perform(
        &self,
        definition: &ActionDefinition,
        request: ActionRequest,
    ) -> ActionDispatchResult<ActionOutput> {
        let gateway = &*self.gateway;
        let output = match request {
            ActionRequest::GetAllBoards => ActionOutput::Boards(BoardsOutput {
                boards: gateway.list_boards().await.map_err(remote(definition))?,
            }),
            ActionRequest::GetBoardById(input) => ActionOutput::Board(BoardOutput {
                board: gateway
                    .get_board(&input.board_id)
                    .await
                    .map_err(remote(definition))?,
            }),
            ActionRequest::GetBoardsByDisplayName(input) => {
                let boards = gateway.list_boards().await.map_err(remote(definition))?;
                ActionOutput::Boards(BoardsOutput {
                    boards: named(boards, &input.board_name, |board| &board.name),
                })
            }
            ActionRequest::GetListById(input) => ActionOutput::List(ListOutput {
                list: gateway
                    .get_list(&input.list_id)
                    .await
                    .map_err(remote(definition))?,
            }),
            ActionRequest::GetListsInBoard(input) => ActionOutput::Lists(ListsOutput {
                lists: gateway
                    .lists_in_board(&input.board_id)
                    .await
                    .map_err(remote(definition))?,
            }),
            ActionRequest::GetListsByDisplayName(input) => {
                let lists = gateway
                    .lists_in_board(&input.board_id)
                    .await
                    .map_err(remote(definition))?;
                ActionOutput::Lists(ListsOutput {
                    lists: named(lists, &input.list_name, |list| &list.name),
                })
            }
            ActionRequest::GetBoardMembers(input) => ActionOutput::Members(MembersOutput {
                members: gateway
                    .board_members(&input.board_id)
                    .await
                    .map_err(remote(definition))?,
            }),
            ActionRequest::GetCardMembers(input) => ActionOutput::Members(MembersOutput {
                members: gateway
                    .card_members(&input.card_id)
                    .await
                    .map_err(remote(definition))?,
            }),
            ActionRequest::GetMemberByIdOrUsername(input) => ActionOutput::Member(MemberOutput {
                member: gateway
                    .get_member(&input.member_id_or_username)
                    .await
                    .map_err(remote(definition))?,
            }),
            ActionRequest::GetCardById(input) => ActionOutput::Card(CardOutput {
                card: gateway
                    .get_card(&input.card_id)
                    .await
                    .map_err(remote(definition))?,
            }),
            ActionRequest::GetCardsByDisplayName(input) => {
                let cards = gateway
                    .cards_in_list(&input.list_id)
                    .await
                    .map_err(remote(definition))?;
                ActionOutput::Cards(CardsOutput {
                    cards: named(cards, &input.card_name, |card| &card.name),
                })
            }
            ActionRequest::GetCardsInList(input) => ActionOutput::Cards(CardsOutput {
                cards: gateway
                    .cards_in_list(&input.list_id)
                    .await
                    .map_err(remote(definition))?,
            }),
            ActionRequest::CreateCard(input) => self.create_card(definition, input).await?,
            ActionRequest::UpdateCard(input) => self.update_card(definition, &input).await?,
            ActionRequest::AddCardComment(input) => self.add_comment(definition, input).await?,
            ActionRequest::MoveCardUp(input) => {
                self.move_card(
                    definition,
                    &input.card_id,
                    MoveDirection::Up,
                    input.move_up_by_n_spaces.get(),
                )
                .await?
            }
            ActionRequest::MoveCardDown(input) => {
                self.move_card(
                    definition,
                    &input.card_id,
                    MoveDirection::Down,
                    input.move_down_by_n_spaces.get(),
                )
                .await?
            }
            ActionRequest::MoveCardToList(input) => {
                self.move_card_to_list(definition, &input).await?
            }
        };
        Ok(output)
    }

    async fn create_card(
        &self,
        definition: &ActionDefinition,
        input: CreateCardInput,
    ) -> ActionDispatchResult<ActionOutput> {
        let CreateCardInput {
            list_id,
            card_name,
            card_body,
            members,
            labels,
            due_date,
        } = input;
        let new_card = NewCard {
            list_id,
            name: card_name,
            description: card_body,
            members: members.unwrap_or_default(),
            labels: labels.unwrap_or_default(),
            due_date,
        };

        let card = self
            .gateway
            .create_card(&new_card)
            .await
            .map_err(remote(definition))?;
        info!(card_id = %card.id, list_id = %card.list_id, "card created");

        Ok(ActionOutput::CreatedCard(CreateCardOutput {
            message: format!("Card created successfully. Card ID: {}", card.id),
            new_card_id: card.id,
        }))
    }

    async fn update_card(
        &self,
        definition: &ActionDefinition,
        input: &UpdateCardInput,
    ) -> ActionDispatchResult<ActionOutput> {
        let snapshot = self
            .gateway
            .get_card(&input.card_id)
            .await
            .map_err(remote(definition))?;
        let plan = CardUpdatePlan::new(&snapshot, input);
        if plan.is_empty() {
            debug!(card_id = %snapshot.id, "card update is a no-op");
            return Ok(ActionOutput::message("Card is already up to date"));
        }

        match plan.apply(&*self.gateway, &snapshot).await {
            Ok(()) => {
                info!(card_id = %snapshot.id, mutations = plan.len(), "card updated");
                Ok(ActionOutput::message("Card updated successfully"))
            }
            Err(CardUpdateFailure::Reverted(cause)) => Err(remote(definition)(cause)),
            Err(CardUpdateFailure::RollbackFailed { cause, rollback }) => {
                Err(ActionDispatchError::RollbackFailed {
                    card_id: snapshot.id,
                    cause: Box::new(cause),
                    rollback: Box::new(rollback),
                })
            }
        }
    }

    async fn add_comment(
        &self,
        definition: &ActionDefinition,
        input: AddCardCommentInput,
    ) -> ActionDispatchResult<ActionOutput> {
        let comment_id = self
            .gateway
            .add_comment(&input.card_id, &input.comment_body)
            .await
            .map_err(remote(definition))?;
        info!(card_id = %input.card_id, %comment_id, "card comment added");

        Ok(ActionOutput::AddedComment(AddCardCommentOutput {
            message: format!("Comment added successfully. Comment ID: {comment_id}"),
            new_comment_id: comment_id,
        }))
    }

    async fn move_card(
        &self,
        definition: &ActionDefinition,
        card_id: &TrelloId,
        direction: MoveDirection,
        spaces: usize,
    ) -> ActionDispatchResult<ActionOutput> {
        let card = self
            .gateway
            .get_card(card_id)
            .await
            .map_err(remote(definition))?;
        let siblings = self
            .gateway
            .cards_in_list(&card.list_id)
            .await
            .map_err(remote(definition))?;
        let position = siblings
            .iter()
            .position(|sibling| sibling.id == card.id)
            .ok_or_else(|| ActionDispatchError::CardNotInList {
                card_id: card.id.clone(),
                list_id: card.list_id.clone(),
            })?;

        let target = match direction {
            MoveDirection::Up => position.checked_sub(spaces),
            MoveDirection::Down => position
                .checked_add(spaces)
                .filter(|candidate| *candidate < siblings.len()),
        }
        .ok_or_else(|| ActionDispatchError::MoveOutOfBounds {
            card_id: card.id.clone(),
            direction,
            spaces,
            position,
            len: siblings.len(),
        })?;

        self.gateway
            .move_card_to_position(&card.id, target)
            .await
            .map_err(remote(definition))?;
        info!(card_id = %card.id, %direction, from = position, to = target, "card moved");

        Ok(ActionOutput::message(format!(
            "Card moved {direction} by {spaces} space(s)"
        )))
    }

    async fn move_card_to_list(
        &self,
        definition: &ActionDefinition,
        input: &MoveCardToListInput,
    ) -> ActionDispatchResult<ActionOutput> {
        let card = self
            .gateway
            .get_card(&input.card_id)
            .await
            .map_err(remote(definition))?;
        if card.list_id == input.new_list_id {
            return Ok(ActionOutput::message("Card is already in the requested list"));
        }

        let current = self
            .gateway
            .get_list(&card.list_id)
            .await
            .map_err(remote(definition))?;
        let destination = self
            .gateway
            .get_list(&input.new_list_id)
            .await
            .map_err(remote(definition))?;
        if current.board_id != destination.board_id {
            return Err(ActionDispatchError::CrossBoardMove {
                card_id: card.id,
                list_id: destination.id,
            });
        }

        self.gateway
            .move_card_to_list(&card.id, &destination.id)
            .await
            .map_err(remote(definition))?;
        info!(card_id = %card.id, list_id = %destination.id, "card moved to list");

        Ok(ActionOutput::message(format!(
            "Card moved to list {}",
            destination.name
        )))
    }
}

/// Keeps the entities whose display name equals `wanted` exactly.
fn named<T>(entities: Vec<T>, wanted: &str, name_of: impl Fn(&T) -> &String) -> Vec<T> {
    entities
        .into_iter()
        .filter(|entity| name_of(entity) == wanted)
        .collect()
}
