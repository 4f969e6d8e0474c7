//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts via `#[from]`.
//! [`SwitchyardError`] crosses port boundaries; [`ExecutionError`] is the
//! per-action taxonomy that ends up in the audit trail instead of aborting a
//! cycle.

use crate::action::FailureKind;
use crate::device::{DeviceType, PowerState};

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum SwitchyardError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The record store failed. Fatal for the running cycle.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("device id must not be empty")]
    EmptyDeviceId,

    #[error("invalid identifier {0:?}")]
    InvalidId(String),

    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },

    #[error("no tariff slot ends after the current time")]
    NoFutureSlots,

    #[error("{field} must fall within years 0000 to 9999")]
    TimestampOutOfRange { field: &'static str },
}

/// A lookup by identifier returned nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Why a single action could not be executed.
///
/// Every variant is row-local: the executor turns it into a `Failed` status
/// and moves on to the next due action.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("configuration error")]
    Configuration(#[from] ConfigurationError),

    #[error("command error")]
    Command(#[from] CommandError),

    #[error("network error")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("verification failed: expected {expected}, device reports {actual}")]
    Verification {
        expected: PowerState,
        actual: PowerState,
    },
}

impl ExecutionError {
    /// Wrap any transport-level failure.
    pub fn network(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Network(Box::new(err))
    }

    /// Category stored in the audit trail.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Configuration(_) => FailureKind::Configuration,
            Self::Command(_) => FailureKind::Command,
            Self::Network(_) => FailureKind::Network,
            Self::Verification { .. } => FailureKind::Verification,
        }
    }

    /// Human-readable description including the full source chain.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

/// The device type or its credentials cannot be resolved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown device type code {0}")]
    UnknownDeviceType(i64),

    #[error("no credentials for {device_type} device {device_id:?}")]
    MissingCredentials {
        device_type: DeviceType,
        device_id: String,
    },

    #[error("credential field {field:?} is missing")]
    MissingField { field: String },

    #[error("credential field {field:?} has an invalid value {value:?}")]
    InvalidField { field: String, value: String },

    #[error("credential source unavailable")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The stored command string does not name a supported operation.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unsupported command {0:?}")]
    Unsupported(String),
}
