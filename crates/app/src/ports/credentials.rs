//! Credential port: where drivers get their per-device configuration.

use std::future::Future;

use switchyard_domain::credentials::Credentials;
use switchyard_domain::device::DeviceType;
use switchyard_domain::error::ConfigurationError;

/// Lookup of driver credentials keyed by `(device type, device id)`.
///
/// Implementations must not cache across calls: the engine asks once per
/// driver construction so edits to the source apply on the next cycle.
pub trait CredentialStore {
    /// Fetch the credentials for one device.
    ///
    /// A missing entry and an unreadable source are both
    /// [`ConfigurationError`]s; they fail the action being executed, not
    /// the cycle.
    fn lookup(
        &self,
        device_type: DeviceType,
        device_id: &str,
    ) -> impl Future<Output = Result<Credentials, ConfigurationError>> + Send;
}
