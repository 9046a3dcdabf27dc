//! # af-sdk
//!
//! Client for the Alternate Futures platform API.
//!
//! Covers the calls the `af` CLI core makes directly: domain, zone, ENS and
//! deployment lookups used while waiting on eventually-consistent state, and
//! the current user. Requests are GraphQL over HTTPS, authenticated with a
//! personal access token.
//!
//! Remote failures come back as [`SdkError`] variants classified from the
//! GraphQL error code, so callers can match on them exhaustively.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::{DomainsApi, EnsApi, SitesApi};
pub use client::{Domains, Ens, PersonalAccessTokenService, SdkClient, SdkOptions, Sites, Users};
pub use error::SdkError;
pub use types::{
    Deployment, DeploymentStatus, Domain, DomainStatus, EnsRecord, EnsRecordStatus, User, Zone,
    ZoneRef,
};
