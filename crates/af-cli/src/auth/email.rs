//! Email one-time-code login, for machines without a browser.

use std::io::{BufRead, Write};

use tracing::{debug, info};

use super::client::AuthClient;
use crate::config::Config;
use crate::error::CliError;

/// Length of the emailed verification code.
pub const CODE_LENGTH: usize = 6;

/// Source of interactive answers.
pub trait Prompter {
    /// Show `question` and return the trimmed answer.
    ///
    /// # Errors
    ///
    /// Returns an error if input cannot be read.
    fn ask(&mut self, question: &str) -> Result<String, CliError>;
}

/// Prompts on stdout and reads lines from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> Result<String, CliError> {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{question}")?;
        stdout.flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }
}

/// Name given to personal access tokens minted by the email login.
#[must_use]
pub fn token_name_for_today() -> String {
    format!("CLI Token - {}", chrono::Utc::now().format("%Y-%m-%d"))
}

fn validate_email(email: &str) -> Result<(), CliError> {
    if email.is_empty() || !email.contains('@') {
        return Err(CliError::InvalidArgument("invalid email address".into()));
    }
    Ok(())
}

fn validate_code(code: &str) -> Result<(), CliError> {
    if code.chars().count() != CODE_LENGTH {
        return Err(CliError::InvalidArgument(format!(
            "invalid verification code, please enter the {CODE_LENGTH}-digit code from the email"
        )));
    }
    Ok(())
}

/// Email login against one auth API.
#[derive(Debug)]
pub struct EmailLogin<'a> {
    client: &'a AuthClient,
}

impl<'a> EmailLogin<'a> {
    /// Email login using `client`.
    #[must_use]
    pub const fn new(client: &'a AuthClient) -> Self {
        Self { client }
    }

    /// Run the login and store the resulting token, clearing the stored
    /// project. Returns the email address that logged in.
    ///
    /// Invalid input aborts before the corresponding request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidArgument`] for a malformed email or code,
    /// [`CliError::Auth`] if the service refuses a step and
    /// [`CliError::Http`] if it is unreachable.
    pub async fn login<P, W>(
        &self,
        config: &Config,
        prompter: &mut P,
        out: &mut W,
    ) -> Result<String, CliError>
    where
        P: Prompter,
        W: Write,
    {
        writeln!(out, "Login via email verification, no browser required.")?;
        writeln!(out)?;

        let email = prompter.ask("Enter your email address: ")?;
        validate_email(&email)?;

        writeln!(out, "Sending verification code...")?;
        let request = self.client.request_email_code(&email).await?;
        writeln!(
            out,
            "✓ Verification code sent, check your inbox (expires in {} minutes)",
            request.expires_in_secs / 60
        )?;
        writeln!(out)?;

        let code = prompter.ask(&format!("Enter the {CODE_LENGTH}-digit verification code: "))?;
        validate_code(&code)?;

        writeln!(out, "Verifying code...")?;
        let session = self.client.verify_email_code(&email, &code).await?;

        writeln!(out, "Creating CLI access token...")?;
        let token = match self
            .client
            .create_personal_access_token(&session.access_token, &token_name_for_today())
            .await?
        {
            Some(token) => token,
            None => {
                debug!("token endpoint unavailable, using access token directly");
                session.access_token
            }
        };

        config.store_personal_access_token(&token)?;
        info!(email = %email, "email login complete");
        Ok(email)
    }
}
