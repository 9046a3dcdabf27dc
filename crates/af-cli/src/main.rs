//! Alternate Futures CLI binary entrypoint.
//!
//! This is the main entry point for the `af` command-line tool.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use af_cli::auth::{StdinPrompter, cancel_on_ctrl_c};
use af_cli::cli::{Cli, Commands};
use af_cli::commands::{
    AuthCommand, DomainsCommand, EnsCommand, PatCommand, SitesCommand, UserCommand,
};
use af_cli::config::{Config, FileStore, Secrets};
use af_cli::endpoints::ServiceUrls;
use af_cli::guard::{ActionOutcome, FAILURE_EXIT_CODE, Guard, InteractiveLogin};
use af_cli::output::OutputFormat;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return parse_failure(&e),
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.debug))
        .with_writer(io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        ActionOutcome::Success => ExitCode::SUCCESS,
        ActionOutcome::Failed { exit_code, message } => {
            eprintln!("Error: {message}");
            ExitCode::from(exit_code)
        }
    }
}

/// Help and version requests exit 0; usage errors exit like any other failure.
fn parse_failure(error: &clap::Error) -> ExitCode {
    let _ = error.print();
    if error.use_stderr() {
        ExitCode::from(FAILURE_EXIT_CODE)
    } else {
        ExitCode::SUCCESS
    }
}

fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    }
}

async fn run(cli: Cli) -> ActionOutcome {
    let format = OutputFormat::new(cli.format);
    let urls = ServiceUrls::from_env();
    let store = match FileStore::default_location() {
        Ok(store) => store,
        Err(e) => return ActionOutcome::from_result(Err(e)),
    };
    let config = Config::new(Arc::new(store), Secrets::from_env());

    let mut stdout = io::stdout().lock();
    let out = &mut stdout;
    let format = &format;

    match cli.command {
        Commands::Login(args) => {
            let cmd = AuthCommand::new(&config, &urls).with_cancellation(cancel_on_ctrl_c());
            ActionOutcome::from_result(cmd.login(out, format, &args, &mut StdinPrompter).await)
        }
        Commands::Logout => {
            let cmd = AuthCommand::new(&config, &urls);
            ActionOutcome::from_result(cmd.logout(out, format))
        }
        Commands::Pat { command } => {
            let cmd = PatCommand::new(&urls).with_cancellation(cancel_on_ctrl_c());
            ActionOutcome::from_result(cmd.execute(out, format, &command, &mut StdinPrompter).await)
        }
        Commands::User { command } => {
            guard(config, urls)
                .run(command, |guarded| async move {
                    UserCommand::new(&guarded.sdk)
                        .execute(out, format, &guarded.args)
                        .await
                        .map_err(anyhow::Error::from)
                })
                .await
        }
        Commands::Domains { command } => {
            guard(config, urls)
                .run(command, |guarded| async move {
                    let domains = guarded.sdk.domains();
                    DomainsCommand::new(&domains)
                        .execute(out, format, &guarded.args)
                        .await
                        .map_err(anyhow::Error::from)
                })
                .await
        }
        Commands::Ens { command } => {
            guard(config, urls)
                .run(command, |guarded| async move {
                    let ens = guarded.sdk.ens();
                    EnsCommand::new(&ens)
                        .execute(out, format, &guarded.args)
                        .await
                        .map_err(anyhow::Error::from)
                })
                .await
        }
        Commands::Sites { command } => {
            guard(config, urls)
                .run(command, |guarded| async move {
                    let sites = guarded.sdk.sites();
                    SitesCommand::new(&sites)
                        .execute(out, format, &guarded.args)
                        .await
                        .map_err(anyhow::Error::from)
                })
                .await
        }
    }
}

fn guard(config: Config, urls: ServiceUrls) -> Guard<InteractiveLogin> {
    Guard::new(config, urls, InteractiveLogin::default())
}
