//! Browser-confirmed login.
//!
//! The CLI opens a verification session, shows its URL, and polls until the
//! user confirms in the browser and the service hands out a token.

use std::convert::Infallible;
use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::client::{AuthClient, VerificationSession};
use crate::config::Config;
use crate::error::CliError;
use crate::poll::{PollOutcome, PollPolicy, check_periodically_until_cancelled};

/// Session name used by `af login`.
pub const LOGIN_SESSION_NAME: &str = "CLI Login";

/// Poll the session until it yields a token.
pub async fn wait_for_personal_access_token(
    client: &AuthClient,
    session: &VerificationSession,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> PollOutcome<String> {
    check_periodically_until_cancelled(policy, cancel, move || async move {
        Ok::<_, Infallible>(client.poll_cli_session(session).await)
    })
    .await
    .unwrap_or_else(|never| match never {})
}

/// Print the link the user has to open.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn show_verification_link<W: Write>(out: &mut W, url: &str) -> std::io::Result<()> {
    writeln!(out, "Follow the link below to log in, then come back here:")?;
    writeln!(out)?;
    writeln!(out, "  {url}")?;
    writeln!(out)?;
    out.flush()
}

/// Token that fires on Ctrl-C.
///
/// Must be called inside a tokio runtime.
#[must_use]
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if matches!(tokio::signal::ctrl_c().await, Ok(())) {
            info!("received SIGINT, cancelling");
            trigger.cancel();
        }
    });
    token
}

/// Browser login handshake against one auth service.
#[derive(Debug)]
pub struct BrowserLogin<'a> {
    client: &'a AuthClient,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl<'a> BrowserLogin<'a> {
    /// Handshake with the standard polling budget and no cancellation.
    #[must_use]
    pub fn new(client: &'a AuthClient) -> Self {
        Self {
            client,
            policy: PollPolicy::CLI_SESSION,
            cancel: CancellationToken::new(),
        }
    }

    /// Override the polling budget.
    #[must_use]
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stop waiting when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the handshake and return the issued token.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Auth`] if the session cannot be started,
    /// [`CliError::LoginTimeout`] if nobody confirms within the budget and
    /// [`CliError::LoginCancelled`] if the cancellation token fires.
    pub async fn request_token<W: Write>(&self, name: &str, out: &mut W) -> Result<String, CliError> {
        let session = self.client.start_cli_session(name).await?;
        show_verification_link(out, &session.verification_url)?;

        info!(
            session = %session.verification_session_id,
            max_wait_secs = self.policy.max_wait().as_secs(),
            "waiting for login confirmation"
        );

        match wait_for_personal_access_token(self.client, &session, self.policy, &self.cancel).await {
            PollOutcome::Ready(token) => Ok(token),
            PollOutcome::TimedOut => Err(CliError::LoginTimeout),
            PollOutcome::Cancelled => Err(CliError::LoginCancelled),
        }
    }

    /// Run the handshake and store the token, clearing the stored project.
    ///
    /// # Errors
    ///
    /// See [`Self::request_token`]; also fails if the token cannot be stored.
    pub async fn login<W: Write>(&self, config: &Config, out: &mut W) -> Result<(), CliError> {
        let token = self.request_token(LOGIN_SESSION_NAME, out).await?;
        config.store_personal_access_token(&token)
    }
}
