//! Execution engine: one resolve-then-execute cycle per call.
//!
//! A cycle first cancels superseded pending actions and commits that, then
//! walks the due actions one at a time: build a driver from fresh
//! credentials, run the command, verify, and persist the terminal status
//! before moving on. Per-action errors end up in the audit trail; only
//! storage errors abort the cycle.
//!
//! The engine has no timer of its own. Callers must not run two cycles
//! concurrently against the same store.

use std::fmt;

use switchyard_domain::action::{Action, Command, Outcome};
use switchyard_domain::conflict;
use switchyard_domain::error::{ExecutionError, SwitchyardError};
use switchyard_domain::time::{self, Timestamp};

use crate::ports::{ActionRepository, CredentialStore, DeviceDriver, DriverFactory};

/// Counts reported at the end of a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Superseded actions cancelled by conflict resolution.
    pub cancelled: u64,
    /// Actions selected for execution.
    pub due: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Selected actions whose row was no longer pending when the outcome
    /// was written.
    pub skipped: usize,
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cancelled={} due={} succeeded={} failed={} skipped={}",
            self.cancelled, self.due, self.succeeded, self.failed, self.skipped
        )
    }
}

/// Runs execution cycles against injected ports.
pub struct ExecutionEngine<R, C, F> {
    repo: R,
    credentials: C,
    drivers: F,
}

impl<R, C, F> ExecutionEngine<R, C, F>
where
    R: ActionRepository,
    C: CredentialStore,
    F: DriverFactory,
{
    /// Create a new engine.
    pub fn new(repo: R, credentials: C, drivers: F) -> Self {
        Self {
            repo,
            credentials,
            drivers,
        }
    }

    /// Run one cycle using the current time.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Storage`] when the action store fails. The
    /// action in flight at that point stays pending.
    pub async fn run_cycle(&self) -> Result<CycleSummary, SwitchyardError> {
        self.run_cycle_at(time::now()).await
    }

    /// Run one cycle treating `now` as the selection cutoff.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Storage`] when the action store fails.
    #[tracing::instrument(skip(self))]
    pub async fn run_cycle_at(&self, now: Timestamp) -> Result<CycleSummary, SwitchyardError> {
        let mut summary = CycleSummary {
            cancelled: self.resolve_conflicts().await?,
            ..CycleSummary::default()
        };

        let due = self.repo.find_due(now).await?;
        summary.due = due.len();

        for action in &due {
            let outcome = Outcome::from(self.execute(action).await);
            let recorded = self
                .repo
                .record_outcome(action.id, &outcome, time::now())
                .await?;

            if !recorded {
                tracing::warn!(action_id = %action.id, "action left pending state during execution, outcome dropped");
                summary.skipped += 1;
                continue;
            }
            match &outcome {
                Outcome::Success => {
                    summary.succeeded += 1;
                    tracing::info!(
                        action_id = %action.id,
                        device_type = %action.device_type,
                        device_id = %action.device_id,
                        command = %action.command,
                        status = %outcome.status(),
                        "action executed"
                    );
                }
                Outcome::Failed(failure) => {
                    summary.failed += 1;
                    tracing::warn!(
                        action_id = %action.id,
                        device_type = %action.device_type,
                        device_id = %action.device_id,
                        command = %action.command,
                        status = %outcome.status(),
                        kind = %failure.kind,
                        reason = %failure.reason,
                        "action failed"
                    );
                }
            }
        }

        tracing::info!(%summary, "execution cycle complete");
        Ok(summary)
    }

    /// Cancel every pending action superseded by a newer one for the same
    /// device and scheduled time. Returns how many rows were cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Storage`] when the action store fails.
    pub async fn resolve_conflicts(&self) -> Result<u64, SwitchyardError> {
        let pending = self.repo.find_pending().await?;
        let losers = conflict::superseded(&pending);
        if losers.is_empty() {
            return Ok(0);
        }
        let cancelled = self.repo.cancel(&losers).await?;
        tracing::info!(cancelled, "cancelled superseded actions");
        Ok(cancelled)
    }

    async fn execute(&self, action: &Action) -> Result<(), ExecutionError> {
        let device_type = action.device_type.resolve()?;
        let credentials = self
            .credentials
            .lookup(device_type, &action.device_id)
            .await?;
        let driver = self
            .drivers
            .build(device_type, &action.device_id, credentials)?;
        let command: Command = action.command.parse()?;
        tracing::debug!(action_id = %action.id, %device_type, %command, "dispatching command");
        driver.execute(command).await
    }
}
