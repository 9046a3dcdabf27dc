//! Authentication command implementation.
//!
//! Handles `login` (browser or email) and `logout`.

use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::auth::{AuthClient, BrowserLogin, EmailLogin, Prompter};
use crate::cli::LoginArgs;
use crate::config::{AF_TOKEN, Config};
use crate::endpoints::ServiceUrls;
use crate::error::CliError;
use crate::output::{AuthResponse, OutputFormat};
use crate::poll::PollPolicy;

/// Handler for `login` and `logout`.
#[derive(Debug)]
pub struct AuthCommand<'a> {
    config: &'a Config,
    urls: &'a ServiceUrls,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl<'a> AuthCommand<'a> {
    /// Creates a new auth command handler.
    #[must_use]
    pub fn new(config: &'a Config, urls: &'a ServiceUrls) -> Self {
        Self {
            config,
            urls,
            policy: PollPolicy::CLI_SESSION,
            cancel: CancellationToken::new(),
        }
    }

    /// Polling budget for the browser login.
    #[must_use]
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Abort the browser login when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Executes `login`.
    ///
    /// # Errors
    ///
    /// Returns error if the login fails or the token cannot be stored.
    pub async fn login<W, P>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &LoginArgs,
        prompter: &mut P,
    ) -> Result<(), CliError>
    where
        W: Write,
        P: Prompter,
    {
        let urls = self.urls.clone().with_auth_override(args.auth_url.as_deref());

        let response = if args.email {
            let client = AuthClient::new(urls.email_auth_api_url())?;
            let email = EmailLogin::new(&client)
                .login(self.config, prompter, out)
                .await?;
            AuthResponse {
                success: true,
                message: format!("Logged in as {email}"),
                email: Some(email),
            }
        } else {
            let client = AuthClient::new(urls.require_auth_service_url()?)?;
            BrowserLogin::new(&client)
                .with_policy(self.policy)
                .with_cancellation(self.cancel.clone())
                .login(self.config, out)
                .await?;
            AuthResponse {
                success: true,
                message: "Logged in".into(),
                email: None,
            }
        };

        self.warn_if_overridden();
        format.write(out, &response)
    }

    /// Executes `logout`.
    ///
    /// # Errors
    ///
    /// Returns error if the credential store cannot be written.
    pub fn logout<W: Write>(&self, out: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        self.config.clear()?;
        self.warn_if_overridden();

        let response = AuthResponse {
            success: true,
            message: "Logged out".into(),
            email: None,
        };
        format.write(out, &response)
    }

    fn warn_if_overridden(&self) {
        if self.config.token_overridden() {
            warn!("{AF_TOKEN} overrides the stored token");
            eprintln!("⚠ {AF_TOKEN} is set and takes precedence over the stored token");
        }
    }
}
