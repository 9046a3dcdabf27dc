//! Waiting for eventually-consistent platform state.
//!
//! Each helper wraps one resource lookup in [`check_periodically_until`].
//! `Ok(None)` / `false` means the budget ran out while the resource was still
//! changing; callers tell the user to check back later.

use std::convert::Infallible;

use af_sdk::{
    DeploymentStatus, DomainStatus, DomainsApi, EnsApi, EnsRecordStatus, SdkError, SitesApi,
};
use tracing::debug;

use crate::poll::{PollPolicy, check_periodically_until};

/// Wait until a domain's creation settles.
///
/// Resolves with [`DomainStatus::Created`] or [`DomainStatus::CreatingFailed`].
///
/// # Errors
///
/// Returns the first lookup error.
pub async fn wait_for_domain_creation_result<D: DomainsApi>(
    domains: &D,
    hostname: &str,
    policy: PollPolicy,
) -> Result<Option<DomainStatus>, SdkError> {
    check_periodically_until(policy, move || async move {
        domains.get_by_hostname(hostname).await.map(|domain| {
            debug!(hostname, status = ?domain.status, "domain status");
            domain.status.is_creation_settled().then_some(domain.status)
        })
    })
    .await
}

/// Wait until an ENS record's verification settles.
///
/// Resolves with [`EnsRecordStatus::Active`] or
/// [`EnsRecordStatus::VerifyingFailed`].
///
/// # Errors
///
/// Returns the first lookup error.
pub async fn wait_for_ens_record_verification_result<E: EnsApi>(
    ens: &E,
    id: &str,
    policy: PollPolicy,
) -> Result<Option<EnsRecordStatus>, SdkError> {
    check_periodically_until(policy, move || async move {
        ens.get(id).await.map(|record| {
            debug!(id, status = ?record.status, "ens record status");
            record.status.is_verification_settled().then_some(record.status)
        })
    })
    .await
}

/// Wait until a deployment's release settles.
///
/// Resolves with [`DeploymentStatus::ReleaseCompleted`] or
/// [`DeploymentStatus::ReleaseFailed`].
///
/// # Errors
///
/// Returns the first lookup error.
pub async fn wait_for_deployment_result<S: SitesApi>(
    sites: &S,
    deployment_id: &str,
    policy: PollPolicy,
) -> Result<Option<DeploymentStatus>, SdkError> {
    check_periodically_until(policy, move || async move {
        sites.get_deployment(deployment_id).await.map(|deployment| {
            debug!(deployment_id, status = ?deployment.status, "deployment status");
            deployment.status.is_release_settled().then_some(deployment.status)
        })
    })
    .await
}

/// Wait until a domain lookup reports [`SdkError::NotFound`].
///
/// Returns `false` if the domain still exists when the budget runs out.
pub async fn wait_until_domain_deleted<D: DomainsApi>(
    domains: &D,
    domain_id: &str,
    policy: PollPolicy,
) -> bool {
    wait_until_gone(policy, "domain", domain_id, move || domains.get(domain_id)).await
}

/// Wait until a DNS zone lookup reports [`SdkError::NotFound`].
///
/// Returns `false` if the zone still exists when the budget runs out.
pub async fn wait_until_zone_deleted<D: DomainsApi>(
    domains: &D,
    zone_id: &str,
    policy: PollPolicy,
) -> bool {
    wait_until_gone(policy, "zone", zone_id, move || domains.get_zone(zone_id)).await
}

/// Wait until an ENS record lookup reports [`SdkError::NotFound`].
///
/// Returns `false` if the record still exists when the budget runs out.
pub async fn wait_until_ens_record_deleted<E: EnsApi>(
    ens: &E,
    id: &str,
    policy: PollPolicy,
) -> bool {
    wait_until_gone(policy, "ens record", id, move || ens.get(id)).await
}

async fn wait_until_gone<T, F, Fut>(policy: PollPolicy, kind: &str, id: &str, mut lookup: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SdkError>>,
{
    let result: Result<Option<()>, Infallible> = check_periodically_until(policy, || {
        let pending = lookup();
        async move {
            match pending.await {
                Ok(_) => Ok(None),
                Err(e) if e.is_not_found() => Ok(Some(())),
                Err(e) => {
                    debug!(kind, id, error = %e, "lookup failed, retrying");
                    Ok(None)
                }
            }
        }
    })
    .await;

    matches!(result, Ok(Some(())))
}
