//! CLI error types.

use af_sdk::SdkError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// A required service URL or setting is not configured.
    #[error("missing required configuration: {key}")]
    MissingConfiguration {
        /// Environment variable (or setting) that was expected.
        key: &'static str,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// No personal access token is available.
    #[error("missing personal access token, run `af login` to authenticate")]
    MissingPersonalAccessToken,

    /// The auth service refused or failed a login step.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The browser login was not confirmed within the polling budget.
    #[error("timed out waiting for the login to be confirmed, run `af login` to try again")]
    LoginTimeout,

    /// The user interrupted the login.
    #[error("login cancelled")]
    LoginCancelled,

    /// Invalid argument or user input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command error: {0}")]
    Command(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// Request to the auth service failed before a response arrived.
    #[error("network request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Platform API error.
    #[error(transparent)]
    Sdk(#[from] SdkError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
