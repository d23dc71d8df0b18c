//! Error types returned by the action waiter.

use crate::hcloud::ClientError;
use crate::types::ActionId;
use std::time::Duration;
use thiserror::Error;

/// Why a wait call did not complete successfully.
///
/// Exactly one of these is returned per failed `wait`; there is no
/// partial-success reporting.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The combined wait across all actions exceeded the configured timeout.
    #[error("action timeout after {0:?}")]
    Timeout(Duration),

    /// The provider reported the action as failed.
    #[error("error completing action {action_id} - code: {code}, message: {message}")]
    ActionFailed {
        action_id: ActionId,
        code: String,
        message: String,
    },

    /// Fetching the action status failed.
    #[error("error getting action {action_id}: {source}")]
    Lookup {
        action_id: ActionId,
        #[source]
        source: ClientError,
    },
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn is_action_failed(&self) -> bool {
        matches!(self, Self::ActionFailed { .. })
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }

    /// The action being processed when the error fired, if the error is tied to one.
    pub fn action_id(&self) -> Option<ActionId> {
        match self {
            Self::Timeout(_) => None,
            Self::ActionFailed { action_id, .. } | Self::Lookup { action_id, .. } => {
                Some(*action_id)
            }
        }
    }
}

pub type WaitResult<T> = Result<T, WaitError>;
