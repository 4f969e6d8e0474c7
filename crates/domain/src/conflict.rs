//! Conflict resolution between pending actions.
//!
//! Several producers may ask for the same device at the same instant. Only
//! the most recently created request survives; the rest are superseded and
//! get cancelled before any action is selected for execution.

use crate::action::Action;
use crate::id::ActionId;
use crate::time::Timestamp;

/// Ids of pending actions that lose to a newer action for the same
/// `(device_id, scheduled_at)` slot.
///
/// The winner of a slot has the greatest `created_at`; ties go to the
/// greatest id. Non-pending actions are ignored. The result is sorted by id.
#[must_use]
pub fn superseded(actions: &[Action]) -> Vec<ActionId> {
    let pending: Vec<&Action> = actions.iter().filter(|a| !a.status.is_terminal()).collect();
    let mut losers: Vec<ActionId> = pending
        .iter()
        .filter(|action| {
            pending.iter().any(|other| {
                other.shares_slot_with(action) && precedence(other) > precedence(action)
            })
        })
        .map(|action| action.id)
        .collect();
    losers.sort_unstable();
    losers
}

fn precedence(action: &Action) -> (Timestamp, ActionId) {
    (action.created_at, action.id)
}
