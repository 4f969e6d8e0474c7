//! Device registry: maps each [`DeviceType`] to its driver constructor.

use std::time::Duration;

use switchyard_app::ports::{DeviceDriver, DriverFactory};
use switchyard_domain::credentials::Credentials;
use switchyard_domain::device::{DeviceType, PowerState};
use switchyard_domain::error::ExecutionError;

use crate::error::DeviceError;
use crate::shelly::ShellyDriver;
use crate::sonoff::SonoffDriver;
use crate::tasmota::TasmotaDriver;
use crate::virtual_switch::{VirtualStates, VirtualSwitch};

/// Wrapper enum for the concrete driver types.
pub enum AnyDriver {
    Virtual(VirtualSwitch),
    Sonoff(SonoffDriver),
    Shelly(ShellyDriver),
    Tasmota(TasmotaDriver),
}

impl DeviceDriver for AnyDriver {
    async fn switch(&self, state: PowerState) -> Result<(), ExecutionError> {
        match self {
            Self::Virtual(d) => d.switch(state).await,
            Self::Sonoff(d) => d.switch(state).await,
            Self::Shelly(d) => d.switch(state).await,
            Self::Tasmota(d) => d.switch(state).await,
        }
    }

    async fn status(&self) -> Result<PowerState, ExecutionError> {
        match self {
            Self::Virtual(d) => d.status().await,
            Self::Sonoff(d) => d.status().await,
            Self::Shelly(d) => d.status().await,
            Self::Tasmota(d) => d.status().await,
        }
    }
}

/// Builds drivers sharing one HTTP client and one set of virtual states.
#[derive(Clone)]
pub struct DeviceRegistry {
    client: reqwest::Client,
    virtual_states: VirtualStates,
}

impl DeviceRegistry {
    /// Create a registry whose HTTP drivers give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, DeviceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("switchyard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            virtual_states: VirtualStates::default(),
        })
    }

    /// State shared by every virtual switch built by this registry.
    #[must_use]
    pub fn virtual_states(&self) -> &VirtualStates {
        &self.virtual_states
    }
}

impl DriverFactory for DeviceRegistry {
    type Driver = AnyDriver;

    fn build(
        &self,
        device_type: DeviceType,
        device_id: &str,
        credentials: Credentials,
    ) -> Result<AnyDriver, ExecutionError> {
        let client = self.client.clone();
        let driver = match device_type {
            DeviceType::Virtual => AnyDriver::Virtual(VirtualSwitch::from_credentials(
                device_id,
                self.virtual_states.clone(),
                &credentials,
            )?),
            DeviceType::Sonoff => {
                AnyDriver::Sonoff(SonoffDriver::from_credentials(client, device_id, &credentials)?)
            }
            DeviceType::Shelly => AnyDriver::Shelly(ShellyDriver::from_credentials(client, &credentials)?),
            DeviceType::Tasmota => {
                AnyDriver::Tasmota(TasmotaDriver::from_credentials(client, &credentials)?)
            }
        };
        tracing::debug!(%device_type, device_id, "driver built");
        Ok(driver)
    }
}
