//! Actions: persisted requests to change a device's power state at or after
//! a given time.
//!
//! Producers create [`NewAction`]s; the store assigns the [`ActionId`] and
//! returns [`Action`] rows. Only the execution engine moves an action out of
//! [`ActionStatus::Pending`], and it never moves it back.

mod command;
mod outcome;
mod status;

pub use command::Command;
pub use outcome::{Failure, FailureKind, InvalidFailureKind, Outcome};
pub use status::{ActionStatus, InvalidStatusCode};

use serde::{Deserialize, Serialize};

use crate::device::{DeviceType, DeviceTypeCode};
use crate::error::{SwitchyardError, ValidationError};
use crate::id::ActionId;
use crate::time::{Timestamp, is_storable};

/// A stored device command and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub created_at: Timestamp,
    pub scheduled_at: Timestamp,
    pub device_type: DeviceTypeCode,
    pub device_id: String,
    /// Raw command name as inserted; parsed into [`Command`] at execution.
    pub command: String,
    pub executed_at: Option<Timestamp>,
    pub status: ActionStatus,
    pub failure: Option<Failure>,
}

impl Action {
    /// Eligible for execution at `now`.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        !self.status.is_terminal()
            && self.executed_at.is_none()
            && self.scheduled_at <= now
    }

    /// Whether two actions compete for the same device slot.
    #[must_use]
    pub fn shares_slot_with(&self, other: &Self) -> bool {
        self.device_id == other.device_id && self.scheduled_at == other.scheduled_at
    }
}

/// An action request before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAction {
    pub created_at: Timestamp,
    pub scheduled_at: Timestamp,
    pub device_type: DeviceTypeCode,
    pub device_id: String,
    pub command: String,
}

impl NewAction {
    /// Create a builder for constructing a [`NewAction`].
    #[must_use]
    pub fn builder() -> NewActionBuilder {
        NewActionBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// Unknown device type codes and command names are accepted here: they
    /// are rejected when the action executes, so the failure lands in the
    /// audit trail.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Validation`] when `device_id` is empty or
    /// a timestamp falls outside years 0000 to 9999.
    pub fn validate(&self) -> Result<(), SwitchyardError> {
        if self.device_id.trim().is_empty() {
            return Err(ValidationError::EmptyDeviceId.into());
        }
        for (field, ts) in [("created_at", self.created_at), ("scheduled_at", self.scheduled_at)] {
            if !is_storable(ts) {
                return Err(ValidationError::TimestampOutOfRange { field }.into());
            }
        }
        Ok(())
    }
}

/// Step-by-step builder for [`NewAction`].
#[derive(Debug, Default)]
pub struct NewActionBuilder {
    created_at: Option<Timestamp>,
    scheduled_at: Option<Timestamp>,
    device_type: Option<DeviceTypeCode>,
    device_id: Option<String>,
    command: Option<String>,
}

impl NewActionBuilder {
    /// Defaults to the build time.
    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Defaults to the creation time (execute as soon as possible).
    #[must_use]
    pub fn scheduled_at(mut self, ts: Timestamp) -> Self {
        self.scheduled_at = Some(ts);
        self
    }

    #[must_use]
    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = Some(device_type.into());
        self
    }

    /// Set a raw device type code, possibly one this build does not know.
    #[must_use]
    pub fn device_type_code(mut self, code: i64) -> Self {
        self.device_type = Some(DeviceTypeCode(code));
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    #[must_use]
    pub fn command(mut self, command: Command) -> Self {
        self.command = Some(command.as_str().to_string());
        self
    }

    /// Set a raw command name, possibly one no driver supports.
    #[must_use]
    pub fn raw_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Consume the builder, validate, and return a [`NewAction`].
    ///
    /// Device type defaults to [`DeviceType::Virtual`] and command to
    /// [`Command::On`].
    ///
    /// # Errors
    ///
    /// Returns [`SwitchyardError::Validation`] if `device_id` is missing or empty.
    pub fn build(self) -> Result<NewAction, SwitchyardError> {
        let created_at = self.created_at.unwrap_or_else(crate::time::now);
        let action = NewAction {
            created_at,
            scheduled_at: self.scheduled_at.unwrap_or(created_at),
            device_type: self
                .device_type
                .unwrap_or_else(|| DeviceType::Virtual.into()),
            device_id: self.device_id.unwrap_or_default(),
            command: self
                .command
                .unwrap_or_else(|| Command::On.as_str().to_string()),
        };
        action.validate()?;
        Ok(action)
    }
}
