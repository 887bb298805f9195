//! Planning and all-or-nothing application of `updateCard` requests.
//!
//! The remote service exposes scalar attributes, members, and labels through
//! separate calls. An update is therefore planned as an ordered list of
//! mutations against a snapshot of the card. Mutations that would not change
//! the snapshot are dropped, and every applied mutation is reverted in
//! reverse order when a later one fails.

use crate::contract::domain::{Card, FieldUpdate, TrelloId, UpdateCardInput};
use crate::dispatch::ports::{CardFieldChanges, TrelloGateway};
use crate::remote::{RemoteResult, RemoteServiceError};
use std::collections::BTreeSet;
use tracing::warn;

/// One remote mutation of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CardMutation {
    Fields(CardFieldChanges),
    AddMember(TrelloId),
    RemoveMember(TrelloId),
    AddLabel(TrelloId),
    RemoveLabel(TrelloId),
}

impl CardMutation {
    async fn apply<G>(&self, gateway: &G, card_id: &TrelloId) -> RemoteResult<()>
    where
        G: TrelloGateway + ?Sized,
    {
        match self {
            Self::Fields(changes) => gateway.update_card_fields(card_id, changes).await,
            Self::AddMember(member_id) => gateway.add_card_member(card_id, member_id).await,
            Self::RemoveMember(member_id) => gateway.remove_card_member(card_id, member_id).await,
            Self::AddLabel(label_id) => gateway.add_card_label(card_id, label_id).await,
            Self::RemoveLabel(label_id) => gateway.remove_card_label(card_id, label_id).await,
        }
    }

    /// Returns the mutation restoring `snapshot` after this one.
    fn inverse(&self, snapshot: &Card) -> Self {
        match self {
            Self::Fields(changes) => Self::Fields(restore_fields(changes, snapshot)),
            Self::AddMember(member_id) => Self::RemoveMember(member_id.clone()),
            Self::RemoveMember(member_id) => Self::AddMember(member_id.clone()),
            Self::AddLabel(label_id) => Self::RemoveLabel(label_id.clone()),
            Self::RemoveLabel(label_id) => Self::AddLabel(label_id.clone()),
        }
    }
}

fn restore_fields(changes: &CardFieldChanges, snapshot: &Card) -> CardFieldChanges {
    CardFieldChanges {
        name: changes.name.as_ref().map(|_| snapshot.name.clone()),
        description: changes
            .description
            .as_ref()
            .map(|_| snapshot.description.clone().unwrap_or_default()),
        closed: changes.closed.map(|_| snapshot.is_closed),
        completed: changes.completed.map(|_| snapshot.is_completed),
        due_date: if changes.due_date.is_keep() {
            FieldUpdate::Keep
        } else {
            FieldUpdate::from(snapshot.due_date)
        },
    }
}

/// Ordered mutations for one `updateCard` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CardUpdatePlan {
    mutations: Vec<CardMutation>,
}

impl CardUpdatePlan {
    /// Plans the mutations turning `snapshot` into the requested card.
    pub(crate) fn new(snapshot: &Card, input: &UpdateCardInput) -> Self {
        let mut mutations = Vec::new();

        let fields = field_changes(snapshot, input);
        if !fields.is_empty() {
            mutations.push(CardMutation::Fields(fields));
        }
        mutations.extend(relation_changes(
            &snapshot.members,
            &input.members_to_add,
            &input.members_to_remove,
            CardMutation::AddMember,
            CardMutation::RemoveMember,
        ));
        mutations.extend(relation_changes(
            &snapshot.labels,
            &input.labels_to_add,
            &input.labels_to_remove,
            CardMutation::AddLabel,
            CardMutation::RemoveLabel,
        ));

        Self { mutations }
    }

    /// Returns whether the update changes nothing.
    pub(crate) fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Returns the number of planned mutations.
    pub(crate) fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Applies every mutation, reverting applied ones if any fails.
    pub(crate) async fn apply<G>(
        &self,
        gateway: &G,
        snapshot: &Card,
    ) -> Result<(), CardUpdateFailure>
    where
        G: TrelloGateway + ?Sized,
    {
        for (applied, mutation) in self.mutations.iter().enumerate() {
            if let Err(cause) = mutation.apply(gateway, &snapshot.id).await {
                warn!(
                    card_id = %snapshot.id,
                    applied,
                    error = %cause,
                    "card update failed; reverting applied changes"
                );
                let completed = self.mutations.iter().take(applied);
                return Err(revert(gateway, snapshot, completed, cause).await);
            }
        }
        Ok(())
    }
}

async fn revert<'a, G>(
    gateway: &G,
    snapshot: &Card,
    completed: impl DoubleEndedIterator<Item = &'a CardMutation>,
    cause: RemoteServiceError,
) -> CardUpdateFailure
where
    G: TrelloGateway + ?Sized,
{
    for mutation in completed.rev() {
        if let Err(rollback) = mutation.inverse(snapshot).apply(gateway, &snapshot.id).await {
            warn!(
                card_id = %snapshot.id,
                error = %rollback,
                "reverting card update failed"
            );
            return CardUpdateFailure::RollbackFailed { cause, rollback };
        }
    }
    CardUpdateFailure::Reverted(cause)
}

/// Failure of an all-or-nothing card update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CardUpdateFailure {
    /// A mutation failed and every applied mutation was reverted.
    Reverted(RemoteServiceError),
    /// A mutation failed and reverting an applied mutation also failed.
    RollbackFailed {
        cause: RemoteServiceError,
        rollback: RemoteServiceError,
    },
}

fn field_changes(snapshot: &Card, input: &UpdateCardInput) -> CardFieldChanges {
    let current_description = snapshot.description.as_deref().unwrap_or_default();
    CardFieldChanges {
        name: input.name.clone().filter(|name| *name != snapshot.name),
        description: input
            .body_text
            .clone()
            .filter(|body| body != current_description),
        closed: input
            .closed_state
            .map(|state| state.is_closed())
            .filter(|closed| *closed != snapshot.is_closed),
        completed: input
            .complete_state
            .map(|state| state.is_complete())
            .filter(|completed| *completed != snapshot.is_completed),
        due_date: match input.due_date {
            FieldUpdate::Set(due) if snapshot.due_date != Some(due) => FieldUpdate::Set(due),
            FieldUpdate::Clear if snapshot.due_date.is_some() => FieldUpdate::Clear,
            FieldUpdate::Keep | FieldUpdate::Set(_) | FieldUpdate::Clear => FieldUpdate::Keep,
        },
    }
}

fn relation_changes(
    current: &[TrelloId],
    to_add: &[TrelloId],
    to_remove: &[TrelloId],
    add: fn(TrelloId) -> CardMutation,
    remove: fn(TrelloId) -> CardMutation,
) -> Vec<CardMutation> {
    let mut present: BTreeSet<&TrelloId> = current.iter().collect();
    let mut mutations = Vec::new();
    for id in to_add {
        if present.insert(id) {
            mutations.push(add(id.clone()));
        }
    }
    for id in to_remove {
        if present.remove(id) {
            mutations.push(remove(id.clone()));
        }
    }
    mutations
}
