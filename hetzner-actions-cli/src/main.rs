//! Example consumer of the action waiter: create a server, or wait on existing actions.

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use commands::Outcome;
use hetzner_actions_waiter::{HcloudClient, ServerCreateOpts, WaitError, WaitOptions};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

const EXIT_ERROR: u8 = 1;
const EXIT_TIMEOUT: u8 = 2;
const EXIT_ACTION_FAILED: u8 = 3;
const EXIT_LOOKUP_FAILED: u8 = 4;
const EXIT_INTERRUPTED: u8 = 130;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn exit_code(err: &WaitError) -> u8 {
    match err {
        WaitError::Timeout(_) => EXIT_TIMEOUT,
        WaitError::ActionFailed { .. } => EXIT_ACTION_FAILED,
        WaitError::Lookup { .. } => EXIT_LOOKUP_FAILED,
    }
}

async fn execute(
    command: Command,
    client: &HcloudClient,
    options: WaitOptions,
    cancel: &CancellationToken,
) -> Result<Outcome> {
    match command {
        Command::CreateServer {
            name,
            server_type,
            image,
            location,
        } => {
            let opts = ServerCreateOpts {
                name,
                server_type,
                image,
                location,
                ..Default::default()
            };
            commands::create_server(client, options, cancel, opts).await
        }
        Command::Wait { action_ids } => {
            commands::wait(client, options, cancel, &action_ids).await
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let client = HcloudClient::with_endpoint(&cli.token, &cli.endpoint)
        .context("Failed to create Hetzner Cloud client")?;
    let options = cli.wait_options();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    // Ctrl-C ends the command at any stage, whatever the lookup-error policy
    tokio::select! {
        biased;
        () = cancel.cancelled() => Ok(Outcome::Interrupted),
        outcome = execute(cli.command, &client, options, &cancel) => outcome,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Interrupted) => ExitCode::from(EXIT_INTERRUPTED),
        Ok(Outcome::WaitFailed(err)) => {
            log::error!("Error waiting: {err}");
            ExitCode::from(exit_code(&err))
        }
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
