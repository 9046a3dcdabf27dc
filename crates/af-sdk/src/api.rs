//! Resource traits used by code that polls remote state.
//!
//! The concrete sub-clients in [`crate::client`] implement these; tests use
//! in-memory fakes.

use std::future::Future;

use crate::error::SdkError;
use crate::types::{Deployment, Domain, EnsRecord, Zone};

/// Domain and DNS zone lookups.
pub trait DomainsApi: Send + Sync {
    /// Fetch a domain by its hostname.
    fn get_by_hostname(&self, hostname: &str)
    -> impl Future<Output = Result<Domain, SdkError>> + Send;

    /// Fetch a domain by ID.
    fn get(&self, domain_id: &str) -> impl Future<Output = Result<Domain, SdkError>> + Send;

    /// Fetch a DNS zone by ID.
    fn get_zone(&self, zone_id: &str) -> impl Future<Output = Result<Zone, SdkError>> + Send;
}

/// ENS record lookups.
pub trait EnsApi: Send + Sync {
    /// Fetch an ENS record by ID.
    fn get(&self, id: &str) -> impl Future<Output = Result<EnsRecord, SdkError>> + Send;
}

/// Site deployment lookups.
pub trait SitesApi: Send + Sync {
    /// Fetch a deployment by ID.
    fn get_deployment(&self, id: &str)
    -> impl Future<Output = Result<Deployment, SdkError>> + Send;
}
