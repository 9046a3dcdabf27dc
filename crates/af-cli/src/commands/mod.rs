//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`auth`] - `login` and `logout`
//! - [`pat`] - Personal access tokens
//! - [`user`] - The authenticated user
//! - [`domains`], [`ens`], [`sites`] - Waiting for platform resources

pub mod auth;
pub mod domains;
pub mod ens;
pub mod pat;
pub mod sites;
pub mod user;

pub use auth::AuthCommand;
pub use domains::DomainsCommand;
pub use ens::EnsCommand;
pub use pat::PatCommand;
pub use sites::SitesCommand;
pub use user::UserCommand;
