//! Action lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an action row.
///
/// Stored as a nullable small integer: `NULL` pending, `-1` cancelled,
/// `0` failed, `1` success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    #[default]
    Pending,
    Cancelled,
    Failed,
    Success,
}

/// A status column held a value outside the lookup table.
#[derive(Debug, thiserror::Error)]
#[error("invalid action status code {0}")]
pub struct InvalidStatusCode(pub i64);

impl ActionStatus {
    /// Column value for this status.
    #[must_use]
    pub fn code(self) -> Option<i64> {
        match self {
            Self::Pending => None,
            Self::Cancelled => Some(-1),
            Self::Failed => Some(0),
            Self::Success => Some(1),
        }
    }

    /// Decode a column value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatusCode`] for codes outside `{-1, 0, 1}`.
    pub fn from_code(code: Option<i64>) -> Result<Self, InvalidStatusCode> {
        match code {
            None => Ok(Self::Pending),
            Some(-1) => Ok(Self::Cancelled),
            Some(0) => Ok(Self::Failed),
            Some(1) => Ok(Self::Success),
            Some(other) => Err(InvalidStatusCode(other)),
        }
    }

    /// Terminal statuses never change again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether rows in this status carry an `executed_at` timestamp.
    #[must_use]
    pub fn records_execution(self) -> bool {
        matches!(self, Self::Failed | Self::Success)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Success => "success",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_codes_both_ways() {
        for status in [
            ActionStatus::Pending,
            ActionStatus::Cancelled,
            ActionStatus::Failed,
            ActionStatus::Success,
        ] {
            assert_eq!(ActionStatus::from_code(status.code()).unwrap(), status);
        }
    }

    #[test]
    fn should_reject_unknown_code() {
        assert!(ActionStatus::from_code(Some(7)).is_err());
    }

    #[test]
    fn should_treat_everything_but_pending_as_terminal() {
        assert!(!ActionStatus::Pending.is_terminal());
        assert!(ActionStatus::Cancelled.is_terminal());
        assert!(ActionStatus::Failed.is_terminal());
        assert!(ActionStatus::Success.is_terminal());
    }

    #[test]
    fn should_record_execution_only_for_attempted_actions() {
        assert!(ActionStatus::Success.records_execution());
        assert!(ActionStatus::Failed.records_execution());
        assert!(!ActionStatus::Cancelled.records_execution());
        assert!(!ActionStatus::Pending.records_execution());
    }
}
