//! Credentials: opaque per-driver configuration fields.
//!
//! The engine never interprets these; each driver pulls the fields it needs
//! (`host`, `access_token`, …) and reports a [`ConfigurationError`] when one is
//! missing or malformed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

/// String key/value pairs for one `(device type, device id)` pair.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    fields: BTreeMap<String, String>,
}

impl Credentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Optional field lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Mandatory field lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingField`] when the field is absent or blank.
    pub fn require(&self, key: &str) -> Result<&str, ConfigurationError> {
        self.get(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingField {
                field: key.to_string(),
            })
    }

    /// Optional field parsed into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidField`] when the value does not parse.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigurationError> {
        self.get(key)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigurationError::InvalidField {
                        field: key.to_string(),
                        value: value.to_string(),
                    })
            })
            .transpose()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// Values are secrets; only the keys are printed.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.fields.keys()).finish()
    }
}
