//! ENS command implementation.

use std::io::Write;

use af_sdk::{EnsApi, EnsRecordStatus};

use crate::cli::EnsCommands;
use crate::error::CliError;
use crate::output::{OutputFormat, WaitReport, status_label};
use crate::poll::PollPolicy;
use crate::wait::{wait_for_ens_record_verification_result, wait_until_ens_record_deleted};

/// Handler for `ens` subcommands.
#[derive(Debug)]
pub struct EnsCommand<'a, E> {
    ens: &'a E,
    policy: PollPolicy,
}

impl<'a, E: EnsApi> EnsCommand<'a, E> {
    /// Creates a new ENS command handler.
    #[must_use]
    pub const fn new(ens: &'a E) -> Self {
        Self {
            ens,
            policy: PollPolicy::RESOURCE,
        }
    }

    /// Polling budget for waits.
    #[must_use]
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Executes the ENS subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if a lookup fails or verification failed.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &EnsCommands,
    ) -> Result<(), CliError> {
        match command {
            EnsCommands::Wait { id } => self.wait(out, format, id).await,
            EnsCommands::WaitDeleted { id } => {
                let gone = wait_until_ens_record_deleted(self.ens, id, self.policy).await;
                format.write(out, &WaitReport::deletion("ens record", id, gone))
            }
        }
    }

    async fn wait<W: Write>(&self, out: &mut W, format: &OutputFormat, id: &str) -> Result<(), CliError> {
        let report = match wait_for_ens_record_verification_result(self.ens, id, self.policy).await? {
            Some(EnsRecordStatus::Active) => {
                WaitReport::settled("ens record", id, status_label(&EnsRecordStatus::Active))
            }
            Some(status) => {
                return Err(CliError::Command(format!(
                    "ens record {id} could not be verified ({})",
                    status_label(&status)
                )));
            }
            None => WaitReport::pending("ens record", id),
        };

        format.write(out, &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use af_sdk::{PersonalAccessTokenService, SdkClient, SdkError, SdkOptions};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn sdk(server: &MockServer) -> SdkClient {
        SdkClient::new(
            SdkOptions::new(server.url("/graphql")),
            PersonalAccessTokenService::new("pat_123", Some("proj_1".into())),
        )
        .expect("client")
    }

    #[tokio::test]
    async fn active_record_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/graphql")
                    .header("x-project-id", "proj_1")
                    .body_includes("ensRecord");
                then.status(200).json_body(json!({
                    "data": { "ensRecord": { "id": "ens_1", "name": "site.eth", "status": "ACTIVE" } }
                }));
            })
            .await;

        let sdk = sdk(&server);
        let ens = sdk.ens();
        let mut out = Vec::new();
        EnsCommand::new(&ens)
            .with_policy(PollPolicy::new(Duration::from_millis(1), 2))
            .execute(
                &mut out,
                &OutputFormat::new(Format::Table),
                &EnsCommands::Wait { id: "ens_1".into() },
            )
            .await
            .expect("wait");

        assert_eq!(String::from_utf8(out).expect("utf8"), "✓ ens record ens_1: ACTIVE\n");
    }

    #[tokio::test]
    async fn deleted_record_is_reported() {
        let server = MockServer::start_async().await;
        let lookup = server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql").body_includes("ensRecord");
                then.status(200).json_body(json!({ "data": { "ensRecord": null } }));
            })
            .await;

        let sdk = sdk(&server);
        let ens = sdk.ens();
        let mut out = Vec::new();
        EnsCommand::new(&ens)
            .with_policy(PollPolicy::new(Duration::from_millis(1), 2))
            .execute(
                &mut out,
                &OutputFormat::new(Format::Json),
                &EnsCommands::WaitDeleted { id: "ens_1".into() },
            )
            .await
            .expect("wait");

        lookup.assert_hits_async(1).await;
        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.contains("\"status\": \"DELETED\""));
        assert!(printed.contains("\"settled\": true"));
    }

    #[tokio::test]
    async fn missing_record_fails_the_wait() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200).json_body(json!({ "data": { "ensRecord": null } }));
            })
            .await;

        let sdk = sdk(&server);
        let ens = sdk.ens();
        let err = EnsCommand::new(&ens)
            .execute(
                &mut Vec::new(),
                &OutputFormat::default(),
                &EnsCommands::Wait { id: "ens_404".into() },
            )
            .await
            .expect_err("not found");
        assert!(matches!(err, CliError::Sdk(SdkError::NotFound { .. })));
    }
}
