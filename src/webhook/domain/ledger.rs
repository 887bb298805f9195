//! Deduplication of redelivered change events.

use super::InboundWebhookEvent;
use crate::contract::domain::TrelloId;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::HashMap;

/// Records which remote actions have already been accepted.
///
/// The remote service may deliver the same change more than once. Entries
/// older than the retention window are forgotten, so a delivery repeated
/// after the window is accepted again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEventLedger {
    retention: TimeDelta,
    seen: HashMap<TrelloId, DateTime<Utc>>,
}

impl Default for ProcessedEventLedger {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RETENTION)
    }
}

impl ProcessedEventLedger {
    /// Retention window used by [`Self::default`].
    pub const DEFAULT_RETENTION: TimeDelta = TimeDelta::hours(24);

    /// Creates an empty ledger with the given retention window.
    #[must_use]
    pub fn new(retention: TimeDelta) -> Self {
        Self {
            retention,
            seen: HashMap::new(),
        }
    }

    /// Returns the retention window.
    #[must_use]
    pub const fn retention(&self) -> TimeDelta {
        self.retention
    }

    /// Records the event's action at the clock's current time.
    ///
    /// Returns `true` when the action had not been seen within the window.
    pub fn record(&mut self, event: &InboundWebhookEvent, clock: &impl Clock) -> bool {
        self.record_at(event.action_id(), clock.utc())
    }

    /// Records `action_id` as processed at `now`.
    ///
    /// Returns `true` when the action had not been seen within the window.
    pub fn record_at(&mut self, action_id: &TrelloId, now: DateTime<Utc>) -> bool {
        self.prune(now);
        if self.seen.contains_key(action_id) {
            return false;
        }
        self.seen.insert(action_id.clone(), now);
        true
    }

    /// Returns whether `action_id` is currently remembered.
    #[must_use]
    pub fn contains(&self, action_id: &TrelloId) -> bool {
        self.seen.contains_key(action_id)
    }

    /// Returns the number of remembered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns whether no action is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forgets every remembered action.
    pub fn clear(&mut self) {
        self.seen.clear();
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let retention = self.retention;
        self.seen.retain(|_, seen_at| now.signed_duration_since(*seen_at) < retention);
    }
}
