//! Transport and protocol errors raised by the drivers.

use switchyard_domain::error::ExecutionError;

/// Errors talking to a device or its vendor cloud.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Connection, timeout, non-success status, or undecodable body.
    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    /// The vendor API answered with an error envelope.
    #[error("vendor api error {code}: {message}")]
    Api { code: i64, message: String },

    /// The vendor cloud reports the device as disconnected.
    #[error("device {0} is offline")]
    Offline(String),

    /// The response did not contain a recognisable power state.
    #[error("unexpected power state {0:?} in device response")]
    UnexpectedState(String),

    /// Simulated transport failure of a virtual device.
    #[error("device {0} is unreachable")]
    Unreachable(String),
}

impl From<DeviceError> for ExecutionError {
    fn from(err: DeviceError) -> Self {
        Self::network(err)
    }
}
