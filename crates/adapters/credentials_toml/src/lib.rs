//! # switchyard-adapter-credentials-toml
//!
//! Device credentials kept in a TOML file, one table per device:
//!
//! ```toml
//! [shelly.immersion]
//! host = "192.168.1.20"
//! channel = 0
//!
//! [sonoff."1000abcdef"]
//! access_token = "..."
//! app_id = "..."
//! region = "eu"
//! ```
//!
//! The outer key is the device type name, the inner key the device id.
//! Scalar values are handed to drivers as strings. The file is read again on
//! every lookup so edits take effect on the next execution cycle.
//!
//! ## Dependency rule
//! Depends on `switchyard-app` (for the port trait) and `switchyard-domain`.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;

use switchyard_app::ports::CredentialStore;
use switchyard_domain::credentials::Credentials;
use switchyard_domain::device::DeviceType;
use switchyard_domain::error::ConfigurationError;

type DeviceTable = BTreeMap<String, BTreeMap<String, toml::Value>>;

/// Errors reading the credentials file.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to read credentials file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credentials file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl From<CredentialError> for ConfigurationError {
    fn from(err: CredentialError) -> Self {
        Self::Source(Box::new(err))
    }
}

/// [`CredentialStore`] reading a TOML file on each lookup.
#[derive(Debug, Clone)]
pub struct TomlCredentialStore {
    path: PathBuf,
}

impl TomlCredentialStore {
    /// Create a store for the file at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<BTreeMap<String, DeviceTable>, CredentialError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CredentialError::Io {
                path: self.path.clone(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| CredentialError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

fn to_field(key: &str, value: toml::Value) -> Result<String, ConfigurationError> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        other => Err(ConfigurationError::InvalidField {
            field: key.to_string(),
            value: other.to_string(),
        }),
    }
}

impl CredentialStore for TomlCredentialStore {
    fn lookup(
        &self,
        device_type: DeviceType,
        device_id: &str,
    ) -> impl Future<Output = Result<Credentials, ConfigurationError>> + Send {
        let store = self.clone();
        let device_id = device_id.to_string();
        async move {
            let mut tables = store.load().await?;
            let entry = tables
                .remove(device_type.as_str())
                .and_then(|mut devices| devices.remove(&device_id))
                .ok_or_else(|| ConfigurationError::MissingCredentials {
                    device_type,
                    device_id: device_id.clone(),
                })?;
            tracing::debug!(%device_type, %device_id, fields = entry.len(), "credentials loaded");
            entry
                .into_iter()
                .map(|(key, value)| to_field(&key, value).map(|v| (key, v)))
                .collect()
        }
    }
}
