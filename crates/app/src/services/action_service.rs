//! Action service: the producer interface and audit queries.

use switchyard_domain::action::{Action, NewAction};
use switchyard_domain::error::{NotFoundError, SwitchyardError, ValidationError};
use switchyard_domain::id::ActionId;
use switchyard_domain::tariff::{CheapestPlan, TariffRate};
use switchyard_domain::time::now;

use crate::ports::ActionRepository;

/// Application service for requesting actions and reading the audit trail.
pub struct ActionService<R> {
    repo: R,
}

impl<R: ActionRepository> ActionService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Record one pending action.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, action), fields(device_id = %action.device_id, command = %action.command))]
    pub async fn request(&self, action: NewAction) -> Result<Action, SwitchyardError> {
        action.validate()?;
        self.repo.insert(action).await
    }

    /// Record several pending actions in one transaction.
    ///
    /// Nothing is inserted when any of them fails validation.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Validation`] if any action is invalid, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, actions), fields(count = actions.len()))]
    pub async fn request_many(&self, actions: Vec<NewAction>) -> Result<Vec<Action>, SwitchyardError> {
        for action in &actions {
            action.validate()?;
        }
        if actions.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.insert_many(actions).await
    }

    /// Plan start/end actions over the cheapest tariff slots and record them.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Validation`] when the plan is invalid or no
    /// slot lies in the future, or a storage error from the repository.
    #[tracing::instrument(skip(self, plan, rates), fields(device_id = %plan.device_id, slots = plan.slots))]
    pub async fn plan_cheapest(
        &self,
        plan: &CheapestPlan,
        rates: &[TariffRate],
    ) -> Result<Vec<Action>, SwitchyardError> {
        let actions = plan.actions(rates, now())?;
        tracing::info!(count = actions.len(), "planned actions for cheapest slots");
        self.request_many(actions).await
    }

    /// Look up an action by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::NotFound`] when no action with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_action(&self, id: ActionId) -> Result<Action, SwitchyardError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Action",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// The latest `limit` actions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Validation`] for a zero limit, or a storage
    /// error propagated from the repository.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<Action>, SwitchyardError> {
        check_limit(limit)?;
        self.repo.get_recent(limit).await
    }

    /// The latest `limit` actions for one device, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Validation`] for a zero limit or an empty
    /// device id, or a storage error propagated from the repository.
    pub async fn list_for_device(
        &self,
        device_id: &str,
        limit: u32,
    ) -> Result<Vec<Action>, SwitchyardError> {
        check_limit(limit)?;
        if device_id.trim().is_empty() {
            return Err(ValidationError::EmptyDeviceId.into());
        }
        self.repo.find_for_device(device_id, limit).await
    }
}

fn check_limit(limit: u32) -> Result<(), SwitchyardError> {
    if limit == 0 {
        return Err(ValidationError::NotPositive { field: "limit" }.into());
    }
    Ok(())
}
