//! Virtual switch: an in-process device for demos and tests.
//!
//! Switch state lives in [`VirtualStates`], owned by the registry, so it
//! survives the per-action driver construction. The optional `fault`
//! credential simulates misbehaving hardware.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use switchyard_app::ports::DeviceDriver;
use switchyard_domain::credentials::Credentials;
use switchyard_domain::device::PowerState;
use switchyard_domain::error::{ConfigurationError, ExecutionError};

use crate::error::DeviceError;

/// Simulated misbehaviour selected by the `fault` credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Commands are accepted but the state never changes.
    Stuck,
    /// Every call fails as if the device were off the network.
    Unreachable,
}

/// Unknown `fault` credential value.
#[derive(Debug, thiserror::Error)]
#[error("unknown fault {0:?}, expected \"stuck\" or \"unreachable\"")]
pub struct UnknownFault(String);

impl FromStr for Fault {
    type Err = UnknownFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stuck" => Ok(Self::Stuck),
            "unreachable" => Ok(Self::Unreachable),
            other => Err(UnknownFault(other.to_string())),
        }
    }
}

/// Power state of every virtual device, keyed by device id. Devices start off.
#[derive(Debug, Clone, Default)]
pub struct VirtualStates(Arc<Mutex<HashMap<String, PowerState>>>);

impl VirtualStates {
    /// Current state of a device, if it was ever switched.
    #[must_use]
    pub fn get(&self, device_id: &str) -> Option<PowerState> {
        self.lock().get(device_id).copied()
    }

    /// Force a device into a state, as if someone flipped it by hand.
    pub fn set(&self, device_id: &str, state: PowerState) {
        self.lock().insert(device_id.to_string(), state);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PowerState>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A simulated switch bound to one device id.
pub struct VirtualSwitch {
    device_id: String,
    states: VirtualStates,
    fault: Option<Fault>,
}

impl VirtualSwitch {
    /// Build a switch from credentials; an empty credential set is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidField`] for an unknown `fault`.
    pub fn from_credentials(
        device_id: &str,
        states: VirtualStates,
        credentials: &Credentials,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            device_id: device_id.to_string(),
            states,
            fault: credentials.parse("fault")?,
        })
    }

    fn reachable(&self) -> Result<(), DeviceError> {
        match self.fault {
            Some(Fault::Unreachable) => Err(DeviceError::Unreachable(self.device_id.clone())),
            _ => Ok(()),
        }
    }
}

impl DeviceDriver for VirtualSwitch {
    async fn switch(&self, state: PowerState) -> Result<(), ExecutionError> {
        self.reachable()?;
        tracing::debug!(device_id = %self.device_id, %state, fault = ?self.fault, "virtual switch");
        if self.fault != Some(Fault::Stuck) {
            self.states.set(&self.device_id, state);
        }
        Ok(())
    }

    async fn status(&self) -> Result<PowerState, ExecutionError> {
        self.reachable()?;
        Ok(self.states.get(&self.device_id).unwrap_or(PowerState::Off))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_domain::action::FailureKind;

    fn switch(states: &VirtualStates, fault: Option<&str>) -> VirtualSwitch {
        let credentials = match fault {
            Some(fault) => Credentials::new().with("fault", fault),
            None => Credentials::new(),
        };
        VirtualSwitch::from_credentials("lamp", states.clone(), &credentials).unwrap()
    }

    #[tokio::test]
    async fn should_default_to_off() {
        let states = VirtualStates::default();
        assert_eq!(switch(&states, None).status().await.unwrap(), PowerState::Off);
    }

    #[tokio::test]
    async fn should_keep_state_across_constructions() {
        let states = VirtualStates::default();
        switch(&states, None).on().await.unwrap();

        let again = switch(&states, None);

        assert_eq!(again.status().await.unwrap(), PowerState::On);
        again.toggle().await.unwrap();
        assert_eq!(states.get("lamp"), Some(PowerState::Off));
    }

    #[tokio::test]
    async fn should_fail_verification_when_stuck() {
        let states = VirtualStates::default();

        let err = switch(&states, Some("stuck")).on().await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::Verification);
        assert_eq!(states.get("lamp"), None);
    }

    #[tokio::test]
    async fn should_fail_with_network_error_when_unreachable() {
        let states = VirtualStates::default();
        let err = switch(&states, Some("unreachable")).off().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Network);
    }

    #[test]
    fn should_reject_unknown_fault() {
        let credentials = Credentials::new().with("fault", "melted");
        let result = VirtualSwitch::from_credentials("lamp", VirtualStates::default(), &credentials);
        assert!(matches!(result, Err(ConfigurationError::InvalidField { .. })));
    }
}
