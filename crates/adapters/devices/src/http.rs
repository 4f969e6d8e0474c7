//! Helpers shared by the HTTP drivers.

use serde::de::DeserializeOwned;
use switchyard_domain::device::PowerState;

use crate::error::DeviceError;

/// Normalise a `host` credential into a base URL without trailing slash.
///
/// Bare hosts (`192.168.1.20`, `plug.local:8080`) get an `http://` scheme.
pub(crate) fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Reject non-success statuses, then decode the JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, DeviceError> {
    let response = response.error_for_status()?;
    Ok(response.json::<T>().await?)
}

/// Parse `on` / `off` in any case.
pub(crate) fn parse_power(value: &str) -> Result<PowerState, DeviceError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" => Ok(PowerState::On),
        "off" => Ok(PowerState::Off),
        _ => Err(DeviceError::UnexpectedState(value.to_string())),
    }
}
