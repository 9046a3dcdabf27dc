//! User command implementation.

use std::io::Write;

use af_sdk::SdkClient;

use crate::cli::UserCommands;
use crate::error::CliError;
use crate::output::{OutputFormat, UserInfo};

/// Handler for `user` subcommands.
#[derive(Debug)]
pub struct UserCommand<'a> {
    sdk: &'a SdkClient,
}

impl<'a> UserCommand<'a> {
    /// Creates a new user command handler.
    #[must_use]
    pub const fn new(sdk: &'a SdkClient) -> Self {
        Self { sdk }
    }

    /// Executes the user subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the platform request fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &UserCommands,
    ) -> Result<(), CliError> {
        match command {
            UserCommands::Me => {
                let user = self.sdk.user().me().await?;
                format.write(out, &UserInfo::from(user))
            }
        }
    }
}
