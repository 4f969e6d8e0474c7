//! Outcome: the tagged result of executing one action.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ActionStatus;
use crate::error::ExecutionError;

/// Category of a failed execution, persisted in `failure_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Configuration,
    Command,
    Network,
    Verification,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Command => "command",
            Self::Network => "network",
            Self::Verification => "verification",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored `failure_kind` value is not recognised.
#[derive(Debug, thiserror::Error)]
#[error("invalid failure kind {0:?}")]
pub struct InvalidFailureKind(pub String);

impl FromStr for FailureKind {
    type Err = InvalidFailureKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "configuration" => Ok(Self::Configuration),
            "command" => Ok(Self::Command),
            "network" => Ok(Self::Network),
            "verification" => Ok(Self::Verification),
            other => Err(InvalidFailureKind(other.to_string())),
        }
    }
}

/// Why an action ended `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub reason: String,
}

/// Result of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(Failure),
}

impl Outcome {
    /// Terminal status this outcome maps to.
    #[must_use]
    pub fn status(&self) -> ActionStatus {
        match self {
            Self::Success => ActionStatus::Success,
            Self::Failed(_) => ActionStatus::Failed,
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Success => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

impl From<&ExecutionError> for Failure {
    fn from(err: &ExecutionError) -> Self {
        Self {
            kind: err.kind(),
            reason: err.describe(),
        }
    }
}

impl From<Result<(), ExecutionError>> for Outcome {
    fn from(result: Result<(), ExecutionError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(err) => Self::Failed(Failure::from(&err)),
        }
    }
}
