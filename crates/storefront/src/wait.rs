//! Wait mechanisms
//!
//! Playwright-style element states and an async polling waiter. Every wait is
//! bounded: on expiry the caller gets [`ShopError::WaitTimeout`] carrying the
//! target, the state and the bound, never an indefinite hang.

use crate::result::{ShopError, ShopResult};
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// ELEMENT STATE
// =============================================================================

/// Target state for element waits (Playwright parity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementState {
    /// At least one match, rendered and not hidden
    #[default]
    Visible,
    /// No match, or the match is not rendered
    Hidden,
    /// At least one match in the DOM
    Attached,
    /// No match in the DOM
    Detached,
}

impl ElementState {
    /// State name as used in error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Attached => "attached",
            Self::Detached => "detached",
        }
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl From<Duration> for WaitOptions {
    fn from(timeout: Duration) -> Self {
        Self::default().with_timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER
// =============================================================================

/// Async polling waiter
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `check` until it yields `true` or the timeout elapses.
    ///
    /// The condition is evaluated at least once, even with a zero timeout.
    /// Errors from `check` abort the wait and are returned unchanged; only
    /// expiry turns into [`ShopError::WaitTimeout`].
    pub async fn until<F, Fut>(
        &self,
        target: &str,
        state: ElementState,
        mut check: F,
    ) -> ShopResult<WaitResult>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = ShopResult<bool>> + Send,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let poll_interval = self.options.poll_interval().max(Duration::from_millis(1));

        loop {
            if check().await? {
                return Ok(WaitResult {
                    elapsed: start.elapsed(),
                    waited_for: format!("{target} to be {state}"),
                });
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(ShopError::WaitTimeout {
                    target: target.to_string(),
                    state: state.to_string(),
                    timeout_ms: self.options.timeout_ms,
                });
            }
            tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
