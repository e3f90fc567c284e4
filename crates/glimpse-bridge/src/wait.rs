//! Wait bounds for extraction and renderer readiness.
//!
//! Extraction blocks on the result slot for at most [`WaitConfig::timeout`].
//! Async renderer setup (page load in the Chrome backend) polls a condition
//! at [`WaitConfig::poll_interval`] until it holds or the timeout expires.

use std::time::Duration;

#[cfg(feature = "chrome")]
use crate::error::{BridgeError, Result};
#[cfg(feature = "chrome")]
use std::{future::Future, time::Instant};
#[cfg(feature = "chrome")]
use tokio::time::sleep;

/// Default bound on a single extraction (2 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default poll interval for async readiness checks (50ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for a result.
    pub timeout: Duration,

    /// How often async conditions are re-checked.
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Custom timeout with the default poll interval.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Waits for a fallible async condition to become true.
///
/// Errors from the condition are treated as "not yet" and the wait goes on;
/// only the timeout ends it unsuccessfully.
#[cfg(feature = "chrome")]
pub async fn wait_for_result<F, Fut>(
    condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();

    loop {
        if let Ok(true) = condition().await {
            return Ok(());
        }

        if start.elapsed() >= config.timeout {
            return Err(BridgeError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}
