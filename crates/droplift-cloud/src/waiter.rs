//! Fixed-interval polling of provider actions and droplet status
//!
//! Waits poll every `WaitConfig::interval` until the target reaches its
//! terminal state. The first failed fetch aborts the wait. Every iteration
//! observes the cancellation token, and an optional deadline bounds the total
//! wait.

use crate::error::CloudError;
use crate::model::{Action, ActionStatus, Droplet, DropletStatus};
use crate::provider::CloudProvider;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Polling cadence used by the provider for long-running actions
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polling settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Pause between two polls
    pub interval: Duration,

    /// Upper bound on the total wait, `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

impl WaitConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Error, Debug)]
pub enum WaitError {
    #[error("failed to poll {target}: {source}")]
    Fetch {
        target: String,
        #[source]
        source: CloudError,
    },

    #[error("action {action_id} on droplet {droplet_id} errored")]
    ActionErrored { droplet_id: u64, action_id: u64 },

    #[error("timed out after {elapsed:?} waiting for {target}")]
    TimedOut { target: String, elapsed: Duration },

    #[error("wait for {target} was cancelled")]
    Cancelled { target: String },
}

/// Run `check` until it yields a value
///
/// `check` returns `Ok(None)` while the target is still pending.
pub async fn poll_until<T, F, Fut>(
    target: &str,
    config: &WaitConfig,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, WaitError>>,
{
    let started = Instant::now();
    let cancelled = || WaitError::Cancelled {
        target: target.to_string(),
    };

    loop {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        let polled = tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled()),
            polled = check() => polled?,
        };

        if let Some(value) = polled {
            return Ok(value);
        }

        let mut pause = config.interval;
        if let Some(timeout) = config.timeout {
            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(WaitError::TimedOut {
                    target: target.to_string(),
                    elapsed,
                });
            }
            // the last pause ends at the deadline, not past it
            pause = pause.min(timeout - elapsed);
        }

        tracing::trace!("{} still pending, sleeping {:?}", target, pause);

        tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled()),
            _ = sleep(pause) => {}
        }
    }
}

/// Wait for a droplet action to complete
pub async fn wait_for_action(
    provider: &dyn CloudProvider,
    droplet_id: u64,
    action_id: u64,
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<Action, WaitError> {
    let target = format!("action {}", action_id);
    let label = target.as_str();

    poll_until(label, config, cancel, move || async move {
        let action = provider
            .get_action(droplet_id, action_id)
            .await
            .map_err(|source| WaitError::Fetch {
                target: label.to_string(),
                source,
            })?;

        match action.status {
            ActionStatus::Completed => Ok(Some(action)),
            ActionStatus::Errored => Err(WaitError::ActionErrored {
                droplet_id,
                action_id,
            }),
            ActionStatus::InProgress => Ok(None),
        }
    })
    .await
}

/// Wait for a droplet to reach `desired` status
pub async fn wait_for_droplet_status(
    provider: &dyn CloudProvider,
    droplet_id: u64,
    desired: DropletStatus,
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<Droplet, WaitError> {
    let target = format!("droplet {} to become {}", droplet_id, desired);
    let label = target.as_str();

    poll_until(label, config, cancel, move || async move {
        let droplet = provider
            .get_droplet(droplet_id)
            .await
            .map_err(|source| WaitError::Fetch {
                target: label.to_string(),
                source,
            })?;

        if droplet.status == desired {
            Ok(Some(droplet))
        } else {
            Ok(None)
        }
    })
    .await
}
