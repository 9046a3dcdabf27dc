//! # af-cli
//!
//! Alternate Futures command-line interface.
//!
//! Provides:
//! - Browser and email login, logout and personal access tokens
//! - A guard chain that authenticates before platform commands run
//! - A poller and wait helpers for eventually-consistent resources
//!
//! # Architecture
//!
//! ```text
//! ┌────────┐  login flows   ┌──────────────┐
//! │   af   │───────────────►│ auth service │
//! │        │                └──────────────┘
//! │ guard ─┼─► af-sdk ─────►┌──────────────┐
//! └────────┘   (GraphQL)    │ platform API │
//!                           └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod guard;
pub mod output;
pub mod poll;
pub mod wait;

pub use cli::{Cli, Commands, Format};
pub use config::{Config, CredentialStore, FileStore, MemoryStore};
pub use endpoints::ServiceUrls;
pub use error::CliError;
pub use guard::{ActionOutcome, Guard, GuardedArgs, InteractiveLogin, LoginFlow};
pub use output::OutputFormat;
pub use poll::{PollOutcome, PollPolicy, check_periodically_until};
