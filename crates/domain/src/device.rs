//! Device families and power states.
//!
//! [`DeviceType`] is the closed set of families the executor can drive. Stored
//! actions carry a raw [`DeviceTypeCode`] instead, because a producer may
//! insert a code this build does not know; it only has to be resolvable when
//! the action is executed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Supported device families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// In-process simulated switch.
    Virtual,
    /// eWeLink cloud-controlled switch.
    Sonoff,
    /// Shelly Gen1 relay on the local network.
    Shelly,
    /// Tasmota firmware on the local network.
    Tasmota,
}

impl DeviceType {
    /// Every known family, in code order.
    pub const ALL: [Self; 4] = [Self::Virtual, Self::Sonoff, Self::Shelly, Self::Tasmota];

    /// Integer code stored in the `device_type` column.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Virtual => 0,
            Self::Sonoff => 1,
            Self::Shelly => 2,
            Self::Tasmota => 3,
        }
    }

    /// Lowercase name used in configuration files and the API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Virtual => "virtual",
            Self::Sonoff => "sonoff",
            Self::Shelly => "shelly",
            Self::Tasmota => "tasmota",
        }
    }

    /// Look up a family by its stored code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownDeviceType`] for unassigned codes.
    pub fn from_code(code: i64) -> Result<Self, ConfigurationError> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(ConfigurationError::UnknownDeviceType(code))
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown device type name.
#[derive(Debug, thiserror::Error)]
#[error("unknown device type {0:?}")]
pub struct UnknownDeviceTypeName(pub String);

impl FromStr for DeviceType {
    type Err = UnknownDeviceTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDeviceTypeName(s.to_string()))
    }
}

/// Raw device type code as persisted on an action row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceTypeCode(pub i64);

impl DeviceTypeCode {
    /// Resolve to a known family.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownDeviceType`] for unassigned codes.
    pub fn resolve(self) -> Result<DeviceType, ConfigurationError> {
        DeviceType::from_code(self.0)
    }
}

impl From<DeviceType> for DeviceTypeCode {
    fn from(value: DeviceType) -> Self {
        Self(value.code())
    }
}

impl fmt::Display for DeviceTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolve() {
            Ok(device_type) => device_type.fmt(f),
            Err(_) => write!(f, "unknown({})", self.0),
        }
    }
}

/// Observed or requested relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// The state a toggle is expected to reach.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
