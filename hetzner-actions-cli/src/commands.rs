//! Subcommand implementations.

use anyhow::{Context, Result};
use hetzner_actions_waiter::{
    Action, ActionId, ActionStatus, ActionWaiter, HcloudClient, ServerCreateOpts, WaitError,
    WaitOptions,
};
use tokio_util::sync::CancellationToken;

/// How a command ended, so `main` can pick an exit code.
#[derive(Debug)]
pub enum Outcome {
    Done,
    WaitFailed(WaitError),
    Interrupted,
}

impl From<Result<(), WaitError>> for Outcome {
    fn from(result: Result<(), WaitError>) -> Self {
        match result {
            Ok(()) => Self::Done,
            Err(e) => Self::WaitFailed(e),
        }
    }
}

pub async fn create_server(
    client: &HcloudClient,
    options: WaitOptions,
    cancel: &CancellationToken,
    opts: ServerCreateOpts,
) -> Result<Outcome> {
    log::info!("Create new server");
    let created = client
        .create_server(&opts)
        .await
        .with_context(|| format!("Failed to create server '{}'", opts.name))?;

    log::info!(
        "Waiting for {} action(s)....",
        created.next_actions.len() + 1
    );
    let result = ActionWaiter::with_options(client, options)
        .wait(cancel, &created.action, &created.next_actions)
        .await;

    if result.is_ok() {
        println!("{}\t{}", created.server.id, created.server.name);
        log::info!("All done successfully");
    }
    Ok(result.into())
}

/// Wait on actions by id. Every lookup goes through the waiter so the
/// lookup-error policy and cancellation apply from the first request.
pub async fn wait(
    client: &HcloudClient,
    options: WaitOptions,
    cancel: &CancellationToken,
    action_ids: &[u64],
) -> Result<Outcome> {
    let actions: Vec<Action> = action_ids
        .iter()
        .map(|id| Action::new(ActionId(*id), ActionStatus::Running))
        .collect();

    let Some((first, rest)) = actions.split_first() else {
        anyhow::bail!("No action ids given");
    };

    log::info!("Waiting for {} action(s)....", actions.len());
    let result = ActionWaiter::with_options(client, options)
        .wait(cancel, first, rest)
        .await;

    if result.is_ok() {
        log::info!("All done successfully");
    }
    Ok(result.into())
}
