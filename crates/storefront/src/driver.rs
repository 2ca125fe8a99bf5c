//! Locator capability - abstract browser driver traits
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  BrowserLauncher ──new_session()──► Session ──► LocatorDriver     │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐        ┌────────────────────────────┐  │
//! │  │  ChromiumLauncher     │        │  MockBrowser               │  │
//! │  │  (feature `browser`)  │        │  (in-memory storefront)    │  │
//! │  │  CDP via chromiumoxide│        │  used by the test suite    │  │
//! │  └──────────────────────┘        └────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page objects only ever talk to [`LocatorDriver`]; swapping the browser
//! implementation never touches them.

use async_trait::async_trait;
use std::time::Duration;

use crate::locator::{ClickOptions, LocatorPath};
use crate::result::ShopResult;
use crate::session::Session;
use crate::wait::{ElementState, WaitOptions, Waiter};

/// Element locator capability of one browsing session.
///
/// Every method takes a [`LocatorPath`] and resolves it fresh against the
/// current DOM. Reads and actions are strict: a chain matching more than one
/// node is an error. After [`LocatorDriver::close`] every call must fail with
/// [`crate::ShopError::SessionClosed`].
#[async_trait]
pub trait LocatorDriver: Send + Sync + std::fmt::Debug {
    /// Navigate the document to an absolute URL
    async fn navigate(&self, url: &str) -> ShopResult<()>;

    /// Current document URL
    async fn current_url(&self) -> ShopResult<String>;

    /// Number of nodes matching the chain
    async fn count(&self, locator: &LocatorPath) -> ShopResult<usize>;

    /// Whether the single match is rendered; `false` when nothing matches
    async fn is_visible(&self, locator: &LocatorPath) -> ShopResult<bool>;

    /// Whether the single match accepts input
    async fn is_enabled(&self, locator: &LocatorPath) -> ShopResult<bool>;

    /// `textContent` of the single match
    async fn text_content(&self, locator: &LocatorPath) -> ShopResult<Option<String>>;

    /// Attribute of the single match
    async fn get_attribute(&self, locator: &LocatorPath, name: &str)
        -> ShopResult<Option<String>>;

    /// Click the single match
    async fn click(&self, locator: &LocatorPath, options: &ClickOptions) -> ShopResult<()>;

    /// Replace the value of the single match
    async fn fill(&self, locator: &LocatorPath, value: &str) -> ShopResult<()>;

    /// Select an option by value or label; returns the selected values
    async fn select_option(&self, locator: &LocatorPath, value: &str) -> ShopResult<Vec<String>>;

    /// Scroll the single match into view
    async fn scroll_into_view(&self, locator: &LocatorPath) -> ShopResult<()>;

    /// Timeout used when a wait does not specify one
    fn default_timeout(&self) -> Duration;

    /// Interval between polls of [`LocatorDriver::wait_for`]
    fn poll_interval(&self) -> Duration {
        Duration::from_millis(crate::wait::DEFAULT_POLL_INTERVAL_MS)
    }

    /// Wait until the chain reaches `state`.
    ///
    /// The default implementation polls [`LocatorDriver::count`] and
    /// [`LocatorDriver::is_visible`].
    async fn wait_for(
        &self,
        locator: &LocatorPath,
        state: ElementState,
        timeout: Option<Duration>,
    ) -> ShopResult<()> {
        let options = WaitOptions::from(timeout.unwrap_or_else(|| self.default_timeout()))
            .with_poll_interval(
                u64::try_from(self.poll_interval().as_millis()).unwrap_or(u64::MAX),
            );
        let target = locator.to_string();
        Waiter::new(options)
            .until(&target, state, || async move {
                match state {
                    ElementState::Visible => self.is_visible(locator).await,
                    ElementState::Hidden => Ok(!self.is_visible(locator).await?),
                    ElementState::Attached => Ok(self.count(locator).await? > 0),
                    ElementState::Detached => Ok(self.count(locator).await? == 0),
                }
            })
            .await?;
        Ok(())
    }

    /// Tear the session down. Idempotent.
    async fn close(&self) -> ShopResult<()>;
}

/// Source of isolated browsing sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync + std::fmt::Debug {
    /// Create a fresh session with its own cookies, storage and history
    async fn new_session(&self) -> ShopResult<Session>;
}
