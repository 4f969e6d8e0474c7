//! Action repository port: the persisted action table.

use std::future::Future;

use switchyard_domain::action::{Action, NewAction, Outcome};
use switchyard_domain::error::SwitchyardError;
use switchyard_domain::id::ActionId;
use switchyard_domain::time::Timestamp;

/// Store for [`Action`] rows.
///
/// Producers only ever append; the execution engine is the only caller of
/// [`cancel`](Self::cancel) and [`record_outcome`](Self::record_outcome).
/// Every storage failure surfaces as [`SwitchyardError::Storage`].
pub trait ActionRepository {
    /// Append one pending action and return it as stored.
    fn insert(
        &self,
        action: NewAction,
    ) -> impl Future<Output = Result<Action, SwitchyardError>> + Send;

    /// Append several pending actions atomically, preserving input order.
    fn insert_many(
        &self,
        actions: Vec<NewAction>,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send;

    /// Get an action by its unique identifier.
    fn get_by_id(
        &self,
        id: ActionId,
    ) -> impl Future<Output = Result<Option<Action>, SwitchyardError>> + Send;

    /// The most recently inserted actions, newest first.
    fn get_recent(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send;

    /// The most recently inserted actions for one device, newest first.
    fn find_for_device(
        &self,
        device_id: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send;

    /// Every action still pending, regardless of its scheduled time.
    fn find_pending(&self) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send;

    /// Mark the given pending actions `Cancelled` in one transaction.
    ///
    /// Rows that are no longer pending are left untouched. Returns how many
    /// rows changed.
    fn cancel(
        &self,
        ids: &[ActionId],
    ) -> impl Future<Output = Result<u64, SwitchyardError>> + Send;

    /// Pending, unexecuted actions scheduled at or before `now`, latest
    /// scheduled first (ties: highest id first).
    fn find_due(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<Action>, SwitchyardError>> + Send;

    /// Persist the terminal status of one execution attempt.
    ///
    /// Only applies while the row is still pending; returns `false` when the
    /// row was already terminal (or does not exist).
    fn record_outcome(
        &self,
        id: ActionId,
        outcome: &Outcome,
        executed_at: Timestamp,
    ) -> impl Future<Output = Result<bool, SwitchyardError>> + Send;
}
