//! Personal access token command implementation.

use std::io::Write;

use tokio_util::sync::CancellationToken;

use crate::auth::{AuthClient, BrowserLogin, Prompter};
use crate::cli::PatCommands;
use crate::endpoints::ServiceUrls;
use crate::error::CliError;
use crate::output::{OutputFormat, PatCreated};
use crate::poll::PollPolicy;

/// Handler for `pat` subcommands.
#[derive(Debug)]
pub struct PatCommand<'a> {
    urls: &'a ServiceUrls,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl<'a> PatCommand<'a> {
    /// Creates a new PAT command handler.
    #[must_use]
    pub fn new(urls: &'a ServiceUrls) -> Self {
        Self {
            urls,
            policy: PollPolicy::CLI_SESSION,
            cancel: CancellationToken::new(),
        }
    }

    /// Polling budget for the browser handshake.
    #[must_use]
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Abort the handshake when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Executes the PAT subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W, P>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &PatCommands,
        prompter: &mut P,
    ) -> Result<(), CliError>
    where
        W: Write,
        P: Prompter,
    {
        match command {
            PatCommands::Create { name } => self.create(out, format, name.as_deref(), prompter).await,
        }
    }

    async fn create<W, P>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        name: Option<&str>,
        prompter: &mut P,
    ) -> Result<(), CliError>
    where
        W: Write,
        P: Prompter,
    {
        let name = match name {
            Some(name) => name.trim().to_string(),
            None => prompter.ask("Enter a name for the new token: ")?,
        };
        if name.is_empty() {
            return Err(CliError::InvalidArgument("token name must not be empty".into()));
        }

        let client = AuthClient::new(self.urls.require_auth_service_url()?)?;
        let token = BrowserLogin::new(&client)
            .with_policy(self.policy)
            .with_cancellation(self.cancel.clone())
            .request_token(&name, out)
            .await?;

        format.write(out, &PatCreated { name, token })
    }
}
