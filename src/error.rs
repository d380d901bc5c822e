//! Top-level error type for procura.
//!
//! Each layer has its own `thiserror` enum; [`AppError`] wraps them so the
//! UI and the CLI can turn any failure into a short message for the user.

use thiserror::Error;

use crate::api::error::ApiError;
use crate::config::ConfigError;
use crate::export::ExportError;
use crate::table::TableError;

/// Any failure that reaches the UI or the CLI.
///
/// The display text keeps the wrapped error's detail for the log; use
/// [`user_message`](AppError::user_message) for anything shown on screen.
#[derive(Debug, Error)]
pub enum AppError {
    /// Config file, profile or settings problems.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Requests against the Frappe site.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// CSV export of table rows.
    #[error("{0}")]
    Export(#[from] ExportError),

    /// Table construction, e.g. a bad namespace or duplicate column ids.
    #[error("{0}")]
    Table(#[from] TableError),

    /// File system errors outside config and export.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw mode, alternate screen or drawing failures.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Anything else, carrying its own message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        AppError::Terminal(msg.into())
    }

    /// Create an error from a plain message.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// A message suitable for a toast or the CLI, without internal detail.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find a configuration directory on this system.".to_string()
                }
                ConfigError::CreateDirError(_) | ConfigError::WriteError(_) => {
                    "Could not save configuration. Check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => "Could not read the configuration file.".to_string(),
                ConfigError::ParseError(_) => {
                    "The configuration file is not valid TOML.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::ProfileNotFound(name) => format!("Profile '{}' not found.", name),
                ConfigError::NoProfile => "No site profile is configured.".to_string(),
            },
            AppError::Api(e) => match e {
                ApiError::Unauthorized => {
                    "Authentication failed. Check the API key and secret for this profile."
                        .to_string()
                }
                ApiError::Forbidden(what) => format!("Permission denied: {}", what),
                ApiError::NotFound(what) => format!("'{}' was not found on the site.", what),
                ApiError::RateLimited => {
                    "Too many requests. Wait a moment and try again.".to_string()
                }
                ApiError::ServerError(msg) => format!("The site reported an error: {}", msg),
                ApiError::Network(_) => {
                    "Could not reach the site. Check the URL and your connection.".to_string()
                }
                ApiError::InvalidUrl(url) => format!("Invalid site URL: '{}'", url),
                ApiError::Keyring(_) => {
                    "Could not read the API secret from the keyring. Run 'procura login' again."
                        .to_string()
                }
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from the site.".to_string()
                }
            },
            AppError::Export(e) => format!("Export failed: {}", e),
            AppError::Table(e) => e.to_string(),
            AppError::Io(_) => "A file operation failed. Check file permissions.".to_string(),
            AppError::Terminal(msg) => format!("Terminal error: {}", msg),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Errors that stop the application from doing anything useful.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Api(ApiError::Unauthorized)
                | AppError::Api(ApiError::InvalidUrl(_))
                | AppError::Api(ApiError::Keyring(_))
                | AppError::Table(_)
                | AppError::Terminal(_)
        )
    }

    /// Errors a retry may clear.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Api(e) => e.is_retryable(),
            AppError::Export(ExportError::Io(_)) => true,
            _ => false,
        }
    }

    /// A short hint on what to do next, for errors where one exists.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::NoProfile)
            | AppError::Config(ConfigError::ProfileNotFound(_))
            | AppError::Api(ApiError::Keyring(_)) => {
                Some("Run 'procura login <profile> --url <site> --api-key <key>'.")
            }
            AppError::Api(ApiError::Unauthorized) => {
                Some("Generate a new API secret for the user in the site and log in again.")
            }
            AppError::Api(ApiError::RateLimited) | AppError::Api(ApiError::Network(_)) => {
                Some("Press 'r' to retry.")
            }
            AppError::Export(_) => Some("Set 'export_dir' in the config file to a writable directory."),
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
