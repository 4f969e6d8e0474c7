//! Tasmota firmware over its local HTTP command endpoint.
//!
//! Credentials: `host` (required), optional `user` / `password` when the web
//! admin password is set.

use serde::Deserialize;

use switchyard_app::ports::DeviceDriver;
use switchyard_domain::credentials::Credentials;
use switchyard_domain::device::PowerState;
use switchyard_domain::error::{ConfigurationError, ExecutionError};

use crate::error::DeviceError;
use crate::http::{base_url, parse_power, read_json};

#[derive(Deserialize)]
struct PowerResponse {
    #[serde(rename = "POWER")]
    power: String,
}

/// Driver for one Tasmota device.
pub struct TasmotaDriver {
    client: reqwest::Client,
    command_url: String,
    login: Vec<(&'static str, String)>,
}

impl TasmotaDriver {
    /// Build a driver from device credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when `host` is missing.
    pub fn from_credentials(
        client: reqwest::Client,
        credentials: &Credentials,
    ) -> Result<Self, ConfigurationError> {
        let host = credentials.require("host")?;
        let mut login = Vec::new();
        if let Some(user) = credentials.get("user") {
            login.push(("user", user.to_string()));
            login.push((
                "password",
                credentials.get("password").unwrap_or_default().to_string(),
            ));
        }
        Ok(Self {
            client,
            command_url: format!("{}/cm", base_url(host)),
            login,
        })
    }

    async fn command(&self, cmnd: &str) -> Result<PowerState, DeviceError> {
        tracing::debug!(url = %self.command_url, cmnd, "tasmota command");
        let response = self
            .client
            .get(&self.command_url)
            .query(&self.login)
            .query(&[("cmnd", cmnd)])
            .send()
            .await?;
        let body: PowerResponse = read_json(response).await?;
        parse_power(&body.power)
    }
}

impl DeviceDriver for TasmotaDriver {
    async fn switch(&self, state: PowerState) -> Result<(), ExecutionError> {
        let cmnd = match state {
            PowerState::On => "Power On",
            PowerState::Off => "Power Off",
        };
        self.command(cmnd).await?;
        Ok(())
    }

    async fn status(&self) -> Result<PowerState, ExecutionError> {
        Ok(self.command("Power").await?)
    }
}
