//! This crate waits for Hetzner Cloud actions to finish:
//! - Action and server types as returned by the Hetzner Cloud API
//! - An [`ActionClient`] seam and a reqwest-based [`HcloudClient`]
//! - The [`ActionWaiter`], which polls actions in order until they succeed, fail, or time out
//!
//! ```no_run
//! use hetzner_actions_waiter::{ActionWaiter, HcloudClient, ServerCreateOpts};
//! use tokio_util::sync::CancellationToken;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HcloudClient::new(&std::env::var("HCLOUD_TOKEN")?)?;
//! let result = client
//!     .create_server(&ServerCreateOpts {
//!         name: "example".into(),
//!         server_type: "cx22".into(),
//!         image: "ubuntu-24.04".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! ActionWaiter::new(&client)
//!     .with_timeout(Duration::from_secs(60))
//!     .wait(&CancellationToken::new(), &result.action, &result.next_actions)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod hcloud;
mod types;
mod waiter;

pub use error::{WaitError, WaitResult};
pub use hcloud::{ActionClient, ClientError, ClientResult, HcloudClient, DEFAULT_ENDPOINT};
pub use types::{
    Action, ActionError, ActionId, ActionResource, ActionStatus, Server, ServerCreateOpts,
    ServerCreateResult,
};
pub use waiter::{ActionWaiter, WaitOptions, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
