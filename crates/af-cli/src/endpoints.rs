//! Service URL resolution from the environment.

use af_sdk::SdkOptions;

use crate::error::CliError;

/// Auth service URL; preferred over [`AUTH_API_URL`].
pub const SDK_AUTH_SERVICE_URL: &str = "SDK__AUTH_SERVICE_URL";
/// Auth API URL; fallback for the auth service and default for email login.
pub const AUTH_API_URL: &str = "AUTH__API_URL";
/// GraphQL API URL.
pub const SDK_GRAPHQL_API_URL: &str = "SDK__GRAPHQL_API_URL";
/// IPFS storage API URL.
pub const SDK_IPFS_STORAGE_API_URL: &str = "SDK__IPFS__STORAGE_API_URL";
/// Upload proxy API URL.
pub const SDK_UPLOAD_PROXY_API_URL: &str = "SDK__UPLOAD_PROXY_API_URL";

/// Used by the email login when nothing else is configured.
pub const DEFAULT_AUTH_API_URL: &str = "https://auth.alternatefutures.ai";

/// Service endpoints resolved for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceUrls {
    auth_service_url: Option<String>,
    auth_api_url: Option<String>,
    graphql_api_url: Option<String>,
    ipfs_storage_api_url: Option<String>,
    upload_proxy_api_url: Option<String>,
}

impl ServiceUrls {
    /// Read endpoints from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read endpoints through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defined = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            auth_service_url: defined(SDK_AUTH_SERVICE_URL),
            auth_api_url: defined(AUTH_API_URL),
            graphql_api_url: defined(SDK_GRAPHQL_API_URL),
            ipfs_storage_api_url: defined(SDK_IPFS_STORAGE_API_URL),
            upload_proxy_api_url: defined(SDK_UPLOAD_PROXY_API_URL),
        }
    }

    /// Auth service URL used by the browser login and the login guard.
    #[must_use]
    pub fn auth_service_url(&self) -> Option<&str> {
        self.auth_service_url
            .as_deref()
            .or(self.auth_api_url.as_deref())
    }

    /// Like [`Self::auth_service_url`], but missing is an error.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingConfiguration`] if neither variable is set.
    pub fn require_auth_service_url(&self) -> Result<&str, CliError> {
        self.auth_service_url()
            .ok_or(CliError::MissingConfiguration {
                key: SDK_AUTH_SERVICE_URL,
            })
    }

    /// Auth API URL for the email login, falling back to the public default.
    #[must_use]
    pub fn email_auth_api_url(&self) -> &str {
        self.auth_api_url.as_deref().unwrap_or(DEFAULT_AUTH_API_URL)
    }

    /// Options for constructing the platform client.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingConfiguration`] if the GraphQL URL is unset.
    pub fn sdk_options(&self) -> Result<SdkOptions, CliError> {
        let graphql = self
            .graphql_api_url
            .clone()
            .ok_or(CliError::MissingConfiguration {
                key: SDK_GRAPHQL_API_URL,
            })?;

        Ok(SdkOptions {
            graphql_service_api_url: graphql,
            ipfs_storage_api_url: self.ipfs_storage_api_url.clone(),
            upload_proxy_api_url: self.upload_proxy_api_url.clone(),
            auth_service_url: self.auth_service_url().map(str::to_string),
        })
    }

    /// Replace the auth URLs with an explicit override (`--auth-url`).
    #[must_use]
    pub fn with_auth_override(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.auth_service_url = Some(url.to_string());
            self.auth_api_url = Some(url.to_string());
        }
        self
    }
}
