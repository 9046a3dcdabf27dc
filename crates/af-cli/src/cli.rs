//! Command-line argument parsing with clap.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Alternate Futures CLI.
#[derive(Parser, Debug, Clone)]
#[command(name = "af")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Log at debug level (overrides `RUST_LOG`).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and store a personal access token.
    Login(LoginArgs),

    /// Remove stored credentials.
    Logout,

    /// Personal access tokens.
    Pat {
        /// PAT subcommand to execute.
        #[command(subcommand)]
        command: PatCommands,
    },

    /// The authenticated user.
    User {
        /// User subcommand to execute.
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Custom domains.
    Domains {
        /// Domains subcommand to execute.
        #[command(subcommand)]
        command: DomainsCommands,
    },

    /// ENS records.
    Ens {
        /// ENS subcommand to execute.
        #[command(subcommand)]
        command: EnsCommands,
    },

    /// Sites and deployments.
    Sites {
        /// Sites subcommand to execute.
        #[command(subcommand)]
        command: SitesCommands,
    },
}

/// Arguments for `af login`.
#[derive(Args, Debug, Clone, Default)]
pub struct LoginArgs {
    /// Log in with a code sent by email instead of the browser.
    #[arg(long)]
    pub email: bool,

    /// Auth service URL, overriding the environment.
    #[arg(long)]
    pub auth_url: Option<String>,
}

/// PAT subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum PatCommands {
    /// Create a personal access token through the browser and print it.
    Create {
        /// Token name; prompted for when omitted.
        #[arg(short, long)]
        name: Option<String>,
    },
}

/// User subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum UserCommands {
    /// Show the authenticated user.
    Me,
}

/// Domains subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DomainsCommands {
    /// Wait until a domain has been created (or failed to).
    Wait {
        /// Domain hostname.
        hostname: String,
    },
    /// Wait until a domain is gone.
    WaitDeleted {
        /// Domain ID.
        domain_id: String,
    },
    /// Wait until a DNS zone is gone.
    WaitZoneDeleted {
        /// Zone ID.
        zone_id: String,
    },
}

/// ENS subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum EnsCommands {
    /// Wait until an ENS record has been verified (or failed to).
    Wait {
        /// ENS record ID.
        id: String,
    },
    /// Wait until an ENS record is gone.
    WaitDeleted {
        /// ENS record ID.
        id: String,
    },
}

/// Sites subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SitesCommands {
    /// Wait until a deployment has been released (or failed to).
    Wait {
        /// Deployment ID.
        deployment_id: String,
    },
}
