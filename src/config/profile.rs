//! Site profile configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::api::AuthScheme;

/// Connection details for one Frappe site.
///
/// The API secret is kept in the OS keyring, never in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Unique, whitespace-free profile name.
    pub name: String,

    /// Site URL, e.g. `https://erp.example.com`.
    pub url: String,

    /// The API key half of the key pair.
    pub api_key: String,

    /// How credentials are sent.
    #[serde(default)]
    pub auth: AuthScheme,
}

impl Profile {
    pub fn new(name: impl Into<String>, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            api_key: api_key.into(),
            auth: AuthScheme::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL must start with http:// or https://",
                self.name
            )));
        }

        if self.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': api_key cannot be empty",
                self.name
            )));
        }

        Ok(())
    }
}
