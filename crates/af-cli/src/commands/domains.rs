//! Domains command implementation.

use std::io::Write;

use af_sdk::{DomainStatus, DomainsApi};
use tracing::info;

use crate::cli::DomainsCommands;
use crate::error::CliError;
use crate::output::{OutputFormat, WaitReport, status_label};
use crate::poll::PollPolicy;
use crate::wait::{
    wait_for_domain_creation_result, wait_until_domain_deleted, wait_until_zone_deleted,
};

/// Handler for `domains` subcommands.
#[derive(Debug)]
pub struct DomainsCommand<'a, D> {
    domains: &'a D,
    policy: PollPolicy,
}

impl<'a, D: DomainsApi> DomainsCommand<'a, D> {
    /// Creates a new domains command handler.
    #[must_use]
    pub const fn new(domains: &'a D) -> Self {
        Self {
            domains,
            policy: PollPolicy::RESOURCE,
        }
    }

    /// Polling budget for waits.
    #[must_use]
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Executes the domains subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if a lookup fails or the domain could not be created.
    /// Deletion waits only fail on output errors.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &DomainsCommands,
    ) -> Result<(), CliError> {
        match command {
            DomainsCommands::Wait { hostname } => self.wait(out, format, hostname).await,
            DomainsCommands::WaitDeleted { domain_id } => {
                info!(domain_id, "waiting for domain deletion");
                let gone = wait_until_domain_deleted(self.domains, domain_id, self.policy).await;
                format.write(out, &WaitReport::deletion("domain", domain_id, gone))
            }
            DomainsCommands::WaitZoneDeleted { zone_id } => {
                info!(zone_id, "waiting for zone deletion");
                let gone = wait_until_zone_deleted(self.domains, zone_id, self.policy).await;
                format.write(out, &WaitReport::deletion("zone", zone_id, gone))
            }
        }
    }

    async fn wait<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        hostname: &str,
    ) -> Result<(), CliError> {
        info!(hostname, "waiting for domain creation");

        let report = match wait_for_domain_creation_result(self.domains, hostname, self.policy).await? {
            Some(DomainStatus::Created) => {
                WaitReport::settled("domain", hostname, status_label(&DomainStatus::Created))
            }
            Some(status) => {
                return Err(CliError::Command(format!(
                    "domain {hostname} could not be created ({})",
                    status_label(&status)
                )));
            }
            None => WaitReport::pending("domain", hostname),
        };

        format.write(out, &report)
    }
}
