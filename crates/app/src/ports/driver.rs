//! Device driver port: the capability set every device family exposes.
//!
//! Drivers implement the two vendor primitives, [`DeviceDriver::switch`] and
//! [`DeviceDriver::status`]. The verified commands are provided on top:
//!
//! | command  | vendor calls                     |
//! |----------|----------------------------------|
//! | `on`     | switch(on), status               |
//! | `off`    | switch(off), status              |
//! | `toggle` | status, switch(opposite), status |
//!
//! There is no retry. A read-back that disagrees with the requested state is
//! a [`ExecutionError::Verification`] even if the vendor call succeeded.

use std::future::Future;

use switchyard_domain::action::Command;
use switchyard_domain::credentials::Credentials;
use switchyard_domain::device::{DeviceType, PowerState};
use switchyard_domain::error::ExecutionError;

/// One constructed driver bound to a single device.
pub trait DeviceDriver: Send + Sync {
    /// Ask the device to move to `state`. No verification.
    fn switch(&self, state: PowerState)
    -> impl Future<Output = Result<(), ExecutionError>> + Send;

    /// Read the current power state. Failures propagate; there is no default.
    fn status(&self) -> impl Future<Output = Result<PowerState, ExecutionError>> + Send;

    /// Switch on and verify.
    fn on(&self) -> impl Future<Output = Result<(), ExecutionError>> + Send {
        self.switch_verified(PowerState::On)
    }

    /// Switch off and verify.
    fn off(&self) -> impl Future<Output = Result<(), ExecutionError>> + Send {
        self.switch_verified(PowerState::Off)
    }

    /// Flip the observed state and verify against its opposite.
    ///
    /// The device may change between the first read and the switch; the
    /// resulting verification failure is reported as-is.
    fn toggle(&self) -> impl Future<Output = Result<(), ExecutionError>> + Send {
        async move {
            let current = self.status().await?;
            self.switch_verified(current.opposite()).await
        }
    }

    /// Switch to `expected`, then read back once.
    fn switch_verified(
        &self,
        expected: PowerState,
    ) -> impl Future<Output = Result<(), ExecutionError>> + Send {
        async move {
            self.switch(expected).await?;
            let actual = self.status().await?;
            verify(expected, actual)
        }
    }

    /// Dispatch a parsed [`Command`].
    fn execute(&self, command: Command) -> impl Future<Output = Result<(), ExecutionError>> + Send {
        async move {
            match command.target_state() {
                Some(state) => self.switch_verified(state).await,
                None => self.toggle().await,
            }
        }
    }
}

/// Compare a read-back with the state the command asked for.
///
/// # Errors
///
/// Returns [`ExecutionError::Verification`] when the states differ.
pub fn verify(expected: PowerState, actual: PowerState) -> Result<(), ExecutionError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ExecutionError::Verification { expected, actual })
    }
}

/// Builds drivers for every supported [`DeviceType`].
///
/// Adding a manufacturer means one [`DeviceType`] variant and one arm in the
/// factory implementation.
pub trait DriverFactory {
    type Driver: DeviceDriver;

    /// Construct a driver for one device from freshly loaded credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Configuration`] when a required credential
    /// field is missing or malformed.
    fn build(
        &self,
        device_type: DeviceType,
        device_id: &str,
        credentials: Credentials,
    ) -> Result<Self::Driver, ExecutionError>;
}
