//! Polling waiter for Hetzner Cloud actions.
//!
//! An [`ActionWaiter`] observes one or more actions until each reaches a terminal
//! state. Actions are polled strictly in order at a fixed interval, and a single
//! deadline covers the whole sequence.

use crate::error::{WaitError, WaitResult};
use crate::hcloud::{ActionClient, ClientError, ClientResult};
use crate::types::{Action, ActionId, ActionStatus};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default deadline for a whole `wait` call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default delay between two status lookups.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Settings for an [`ActionWaiter`]. Override only what you need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Budget for all actions of one `wait` call combined.
    pub timeout: Duration,
    /// Retry failed status lookups instead of failing the wait.
    pub ignore_lookup_errors: bool,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            ignore_lookup_errors: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// A lookup may fail because of a temporary network error; when enabled the
    /// lookup is retried until the timeout instead of failing the wait.
    pub fn with_ignore_lookup_errors(mut self, ignore: bool) -> Self {
        self.ignore_lookup_errors = ignore;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Waits for actions to finish by polling their status.
///
/// The client is borrowed: the caller keeps ownership and may reuse it for
/// other calls, including other waiters running concurrently.
pub struct ActionWaiter<'a, C: ?Sized> {
    client: &'a C,
    options: WaitOptions,
}

impl<'a, C> ActionWaiter<'a, C>
where
    C: ActionClient + ?Sized,
{
    /// Create a waiter with the default options (60s timeout, lookup errors not ignored).
    pub fn new(client: &'a C) -> Self {
        Self::with_options(client, WaitOptions::default())
    }

    pub fn with_options(client: &'a C, options: WaitOptions) -> Self {
        Self { client, options }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_timeout(timeout);
        self
    }

    pub fn with_ignore_lookup_errors(mut self, ignore: bool) -> Self {
        self.options = self.options.with_ignore_lookup_errors(ignore);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.options = self.options.with_poll_interval(interval);
        self
    }

    pub fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Wait for `action` and then each of `next_actions`, in order.
    ///
    /// Returns once every action reported success. Stops at the first action that
    /// reports an error, at the first failed lookup (unless lookup errors are
    /// ignored), or when the timeout measured from this call elapses. The
    /// timeout is shared by all actions and never restarted.
    ///
    /// Lookups are raced against `cancel`; a cancelled token makes the in-flight
    /// lookup fail with [`ClientError::Cancelled`].
    pub async fn wait(
        &self,
        cancel: &CancellationToken,
        action: &Action,
        next_actions: &[Action],
    ) -> WaitResult<()> {
        // A timeout too large to represent never fires
        let deadline = Instant::now().checked_add(self.options.timeout);

        for (index, action) in std::iter::once(action).chain(next_actions).enumerate() {
            log::debug!(
                "Waiting for action {} ({}/{})",
                action.id,
                index + 1,
                next_actions.len() + 1
            );
            self.wait_for_action(cancel, action.id, deadline).await?;
        }

        Ok(())
    }

    async fn wait_for_action(
        &self,
        cancel: &CancellationToken,
        id: ActionId,
        deadline: Option<Instant>,
    ) -> WaitResult<()> {
        loop {
            if deadline.is_some_and(|deadline| Instant::now() > deadline) {
                log::warn!(
                    "Timed out after {:?} waiting for action {id}",
                    self.options.timeout
                );
                return Err(WaitError::Timeout(self.options.timeout));
            }

            match self.lookup(cancel, id).await {
                Ok(action) if action.status.is_terminal() => return finish(id, action),
                Ok(action) => {
                    log::debug!(
                        "Action {id} ({}) is {} ({}%)",
                        action.command,
                        action.status,
                        action.progress
                    );
                }
                Err(e) if self.options.ignore_lookup_errors => {
                    log::warn!("Ignoring error getting action {id}: {e}");
                }
                Err(e) => {
                    return Err(WaitError::Lookup {
                        action_id: id,
                        source: e,
                    });
                }
            }

            tokio::time::sleep(self.options.poll_interval).await;
        }
    }

    async fn lookup(&self, cancel: &CancellationToken, id: ActionId) -> ClientResult<Action> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.client.get_action(id) => result,
        }
    }
}

/// Turn an action in a terminal state into the result of waiting for it.
fn finish(id: ActionId, action: Action) -> WaitResult<()> {
    if action.status == ActionStatus::Success {
        log::info!("Action {id} ({}) completed", action.command);
        return Ok(());
    }

    let (code, message) = action.error.map_or_else(
        || {
            (
                "unknown_error".to_string(),
                "action failed without error details".to_string(),
            )
        },
        |e| (e.code, e.message),
    );
    log::error!("Action {id} failed - code: {code}, message: {message}");
    Err(WaitError::ActionFailed {
        action_id: id,
        code,
        message,
    })
}
