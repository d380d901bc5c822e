//! API key authentication for Frappe sites.
//!
//! Frappe accepts `token <key>:<secret>` or HTTP Basic over the same pair.
//! The secret lives in the OS keyring under the profile name.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, Result};

/// The keyring service name for procura secrets.
const KEYRING_SERVICE: &str = "procura";

/// How the key pair is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: token <key>:<secret>`
    #[default]
    Token,
    /// `Authorization: Basic base64(<key>:<secret>)`
    Basic,
}

/// Authentication credentials for a Frappe site.
#[derive(Clone)]
pub struct Auth {
    api_key: String,
    auth_header: String,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth").field("api_key", &self.api_key).finish()
    }
}

impl Auth {
    /// Build credentials. The raw secret is not kept.
    pub fn new(api_key: &str, api_secret: &str, scheme: AuthScheme) -> Self {
        Self {
            api_key: api_key.to_string(),
            auth_header: build_auth_header(api_key, api_secret, scheme),
        }
    }

    /// Build credentials with the secret read from the keyring.
    pub fn from_keyring(profile_name: &str, api_key: &str, scheme: AuthScheme) -> Result<Self> {
        let secret = get_secret(profile_name)?;
        Ok(Self::new(api_key, &secret, scheme))
    }

    /// The complete `Authorization` header value.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

fn build_auth_header(api_key: &str, api_secret: &str, scheme: AuthScheme) -> String {
    match scheme {
        AuthScheme::Token => format!("token {}:{}", api_key, api_secret),
        AuthScheme::Basic => {
            let encoded = BASE64.encode(format!("{}:{}", api_key, api_secret).as_bytes());
            format!("Basic {}", encoded)
        }
    }
}

fn entry(profile_name: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))
}

/// Store an API secret in the OS keyring.
pub fn store_secret(profile_name: &str, secret: &str) -> Result<()> {
    entry(profile_name)?
        .set_password(secret)
        .map_err(|e| ApiError::Keyring(format!("failed to store secret: {}", e)))
}

/// Read an API secret from the OS keyring.
pub fn get_secret(profile_name: &str) -> Result<String> {
    entry(profile_name)?
        .get_password()
        .map_err(|e| ApiError::Keyring(format!("failed to retrieve secret: {}", e)))
}

/// Whether a secret is stored for the profile.
pub fn has_secret(profile_name: &str) -> bool {
    get_secret(profile_name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_header() {
        let auth = Auth::new("key123", "secret456", AuthScheme::Token);
        assert_eq!(auth.header_value(), "token key123:secret456");
    }

    #[test]
    fn test_basic_header_decodes_to_pair() {
        let auth = Auth::new("key123", "secret456", AuthScheme::Basic);
        let encoded = auth.header_value().strip_prefix("Basic ").unwrap();
        let decoded = String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap();
        assert_eq!(decoded, "key123:secret456");
    }

    #[test]
    fn test_debug_hides_secret() {
        let auth = Auth::new("key123", "secret456", AuthScheme::Token);
        let debug = format!("{:?}", auth);
        assert!(debug.contains("key123"));
        assert!(!debug.contains("secret456"));
    }

    #[test]
    fn test_scheme_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            auth: AuthScheme,
        }
        let w: Wrapper = toml::from_str("auth = \"basic\"").unwrap();
        assert_eq!(w.auth, AuthScheme::Basic);
    }
}
