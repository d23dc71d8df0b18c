//! Hetzner Cloud integration: the action lookup seam and a reqwest-based API client.

mod client;

pub use client::{HcloudClient, DEFAULT_ENDPOINT};

use crate::types::{Action, ActionId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Hetzner client configuration error: {0}")]
    Config(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Hetzner API error (status {status}) - code: {code}, message: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    #[error("Invalid response from Hetzner API: {0}")]
    InvalidResponse(String),
    #[error("request cancelled")]
    Cancelled,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Read access to action status, the only capability the waiter needs from a provider.
///
/// Implementations must be idempotent and free of side effects; the waiter calls
/// `get_action` repeatedly for the same id.
#[async_trait]
pub trait ActionClient: Send + Sync {
    async fn get_action(&self, id: ActionId) -> ClientResult<Action>;
}

