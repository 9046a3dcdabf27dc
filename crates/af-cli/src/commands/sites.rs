//! Sites command implementation.

use std::io::Write;

use af_sdk::{DeploymentStatus, SitesApi};
use tracing::info;

use crate::cli::SitesCommands;
use crate::error::CliError;
use crate::output::{OutputFormat, WaitReport, status_label};
use crate::poll::PollPolicy;
use crate::wait::wait_for_deployment_result;

/// Handler for `sites` subcommands.
#[derive(Debug)]
pub struct SitesCommand<'a, S> {
    sites: &'a S,
    policy: PollPolicy,
}

impl<'a, S: SitesApi> SitesCommand<'a, S> {
    /// Creates a new sites command handler.
    #[must_use]
    pub const fn new(sites: &'a S) -> Self {
        Self {
            sites,
            policy: PollPolicy::DEPLOYMENT,
        }
    }

    /// Polling budget for waits.
    #[must_use]
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Executes the sites subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if a lookup fails or the release failed.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &SitesCommands,
    ) -> Result<(), CliError> {
        let SitesCommands::Wait { deployment_id } = command;
        info!(deployment_id, "waiting for deployment");

        let report = match wait_for_deployment_result(self.sites, deployment_id, self.policy).await? {
            Some(DeploymentStatus::ReleaseCompleted) => WaitReport::settled(
                "deployment",
                deployment_id,
                status_label(&DeploymentStatus::ReleaseCompleted),
            ),
            Some(status) => {
                return Err(CliError::Command(format!(
                    "deployment {deployment_id} failed ({})",
                    status_label(&status)
                )));
            }
            None => WaitReport::pending("deployment", deployment_id),
        };

        format.write(out, &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use af_sdk::{PersonalAccessTokenService, SdkClient, SdkOptions};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn wait(id: &str) -> SitesCommands {
        SitesCommands::Wait {
            deployment_id: id.into(),
        }
    }

    async fn sdk_with_status(server: &MockServer, status: &'static str) -> SdkClient {
        server
            .mock_async(move |when, then| {
                when.method(POST).path("/graphql").body_includes("deployment(where");
                then.status(200).json_body(json!({
                    "data": { "deployment": { "id": "dep_1", "status": status, "cid": "bafy" } }
                }));
            })
            .await;
        SdkClient::new(
            SdkOptions::new(server.url("/graphql")),
            PersonalAccessTokenService::new("pat_123", None),
        )
        .expect("client")
    }

    #[tokio::test]
    async fn completed_release_is_reported_as_json() {
        let server = MockServer::start_async().await;
        let sdk = sdk_with_status(&server, "RELEASE_COMPLETED").await;
        let sites = sdk.sites();

        let mut out = Vec::new();
        SitesCommand::new(&sites)
            .with_policy(PollPolicy::new(Duration::from_millis(1), 2))
            .execute(&mut out, &OutputFormat::new(Format::Json), &wait("dep_1"))
            .await
            .expect("wait");

        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.contains("\"status\": \"RELEASE_COMPLETED\""));
        assert!(printed.contains("\"settled\": true"));
    }

    #[tokio::test]
    async fn failed_release_is_an_error() {
        let server = MockServer::start_async().await;
        let sdk = sdk_with_status(&server, "RELEASE_FAILED").await;
        let sites = sdk.sites();

        let err = SitesCommand::new(&sites)
            .with_policy(PollPolicy::new(Duration::from_millis(1), 2))
            .execute(&mut Vec::new(), &OutputFormat::default(), &wait("dep_1"))
            .await
            .expect_err("release failed");
        assert_eq!(err.to_string(), "command error: deployment dep_1 failed (RELEASE_FAILED)");
    }

    #[tokio::test]
    async fn build_still_running_is_pending() {
        let server = MockServer::start_async().await;
        let sdk = sdk_with_status(&server, "BUILD_IN_PROGRESS").await;
        let sites = sdk.sites();

        let mut out = Vec::new();
        SitesCommand::new(&sites)
            .with_policy(PollPolicy::new(Duration::from_millis(1), 2))
            .execute(&mut out, &OutputFormat::default(), &wait("dep_1"))
            .await
            .expect("pending");
        assert!(String::from_utf8(out).expect("utf8").contains("still pending, check later"));
    }
}
