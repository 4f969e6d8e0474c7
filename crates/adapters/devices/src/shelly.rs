//! Shelly Gen1 relay over the local HTTP API.
//!
//! Credentials: `host` (required), `channel` (default `0`), and optional
//! `username` / `password` for devices with restricted login.

use serde::Deserialize;

use switchyard_app::ports::DeviceDriver;
use switchyard_domain::credentials::Credentials;
use switchyard_domain::device::PowerState;
use switchyard_domain::error::{ConfigurationError, ExecutionError};

use crate::error::DeviceError;
use crate::http::{base_url, read_json};

#[derive(Deserialize)]
struct RelayStatus {
    ison: bool,
}

/// Driver for one Shelly relay channel.
pub struct ShellyDriver {
    client: reqwest::Client,
    relay_url: String,
    login: Option<(String, Option<String>)>,
}

impl ShellyDriver {
    /// Build a driver from device credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when `host` is missing or `channel` is
    /// not a number.
    pub fn from_credentials(
        client: reqwest::Client,
        credentials: &Credentials,
    ) -> Result<Self, ConfigurationError> {
        let host = credentials.require("host")?;
        let channel: u8 = credentials.parse("channel")?.unwrap_or(0);
        let login = credentials.get("username").map(|user| {
            (
                user.to_string(),
                credentials.get("password").map(str::to_string),
            )
        });
        Ok(Self {
            client,
            relay_url: format!("{}/relay/{channel}", base_url(host)),
            login,
        })
    }

    fn get(&self) -> reqwest::RequestBuilder {
        let request = self.client.get(&self.relay_url);
        match &self.login {
            Some((user, password)) => request.basic_auth(user, password.as_ref()),
            None => request,
        }
    }
}

impl DeviceDriver for ShellyDriver {
    async fn switch(&self, state: PowerState) -> Result<(), ExecutionError> {
        tracing::debug!(url = %self.relay_url, %state, "shelly switch");
        let response = self
            .get()
            .query(&[("turn", state.as_str())])
            .send()
            .await
            .map_err(DeviceError::from)?;
        let _: RelayStatus = read_json(response).await?;
        Ok(())
    }

    async fn status(&self) -> Result<PowerState, ExecutionError> {
        tracing::debug!(url = %self.relay_url, "shelly status");
        let response = self.get().send().await.map_err(DeviceError::from)?;
        let relay: RelayStatus = read_json(response).await?;
        Ok(PowerState::from(relay.ison))
    }
}
