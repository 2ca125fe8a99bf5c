//! In-memory storefront browser.
//!
//! [`MockBrowser`] implements [`BrowserLauncher`] without a real browser: each
//! session owns a [`Storefront`] that is re-rendered to a [`dom::Dom`] on every
//! driver call, so locators are always resolved against the current state.
//! Reads and actions auto-wait for a single match the way Playwright does,
//! polling until the driver's timeout.
//!
//! ## Example
//!
//! ```rust,ignore
//! use storefront_e2e::{BrowserLauncher, MockBrowser};
//!
//! let browser = MockBrowser::new();
//! let session = browser.new_session().await?;
//! session.document().goto("/").await?;
//! ```

pub mod dom;
pub mod selector;
pub mod storefront;

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::{ShopConfig, DEFAULT_BASE_URL};
use crate::driver::{BrowserLauncher, LocatorDriver};
use crate::locator::{ClickOptions, LocatorPath};
use crate::result::{ShopError, ShopResult};
use crate::session::{closed, Session};
use crate::wait::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

pub use dom::{Dom, Element, NodeId};
pub use storefront::{
    Action, Product, Route, Storefront, COMPLETE_HEADER, COMPLETE_TEXT, INVENTORY, LOCKED_OUT_USER,
    PASSWORD, USERS,
};

#[derive(Debug, Default)]
struct SessionCounters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Launcher for in-memory storefront sessions
#[derive(Debug, Clone)]
pub struct MockBrowser {
    base_url: String,
    settle_delay: Duration,
    default_timeout: Duration,
    poll_interval: Duration,
    counters: Arc<SessionCounters>,
}

impl Default for MockBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBrowser {
    /// Storefront at the default base URL, no settle delay
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            settle_delay: Duration::ZERO,
            default_timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            counters: Arc::default(),
        }
    }

    /// Base URL and timeouts from `config`
    #[must_use]
    pub fn from_config(config: &ShopConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            default_timeout: config.default_timeout(),
            poll_interval: config.poll_interval(),
            ..Self::new()
        }
    }

    /// Delay before click effects become visible
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Timeout for auto-waiting reads, actions and unbounded waits
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sessions created so far
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Sessions closed so far
    #[must_use]
    pub fn sessions_closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Sessions created but not yet closed
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.sessions_opened().saturating_sub(self.sessions_closed())
    }
}

#[async_trait]
impl BrowserLauncher for MockBrowser {
    async fn new_session(&self) -> ShopResult<Session> {
        let id = Uuid::new_v4();
        let driver = MockDriver {
            id,
            state: Mutex::new(Storefront::new(&self.base_url).with_settle_delay(self.settle_delay)),
            closed: AtomicBool::new(false),
            default_timeout: self.default_timeout,
            poll_interval: self.poll_interval,
            counters: Arc::clone(&self.counters),
        };
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(session = %id, "mock session opened");
        Ok(Session::with_id(id, Arc::new(driver), &self.base_url))
    }
}

/// What a single match must satisfy before the driver acts on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Need {
    Attached,
    Actionable,
}

impl Need {
    fn satisfied(self, dom: &Dom, id: NodeId) -> bool {
        match self {
            Self::Attached => true,
            Self::Actionable => dom.is_visible(id) && dom.is_enabled(id),
        }
    }
}

impl fmt::Display for Need {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attached => "attached",
            Self::Actionable => "visible and enabled",
        })
    }
}

#[derive(Debug)]
struct MockDriver {
    id: Uuid,
    state: Mutex<Storefront>,
    closed: AtomicBool,
    default_timeout: Duration,
    poll_interval: Duration,
    counters: Arc<SessionCounters>,
}

impl MockDriver {
    fn ensure_open(&self) -> ShopResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(closed(self.id))
        } else {
            Ok(())
        }
    }

    /// Current DOM and the matches of `path`
    async fn snapshot(&self, path: &LocatorPath) -> ShopResult<(Dom, Vec<NodeId>)> {
        self.ensure_open()?;
        let dom = {
            let mut state = self.state.lock().await;
            state.settle(Instant::now());
            state.render()
        };
        let ids = selector::resolve(&dom, path).map_err(|m| ShopError::locator(path, m))?;
        Ok((dom, ids))
    }

    /// Wait for exactly one match meeting `need`, then run `act` on it.
    ///
    /// More than one match fails at once (strict mode).
    async fn on_single<T, F>(
        &self,
        path: &LocatorPath,
        need: Need,
        timeout: Option<Duration>,
        act: F,
    ) -> ShopResult<T>
    where
        F: Fn(&mut Storefront, &Dom, NodeId) -> ShopResult<T> + Send,
    {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let deadline = Instant::now() + timeout;
        loop {
            self.ensure_open()?;
            {
                let mut state = self.state.lock().await;
                state.settle(Instant::now());
                let dom = state.render();
                let ids = selector::resolve(&dom, path).map_err(|m| ShopError::locator(path, m))?;
                match ids.as_slice() {
                    [id] if need.satisfied(&dom, *id) => return act(&mut state, &dom, *id),
                    [_, _, ..] => {
                        return Err(ShopError::locator(
                            path,
                            format!("strict mode violation: resolved to {} elements", ids.len()),
                        ))
                    }
                    _ => {}
                }
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ShopError::WaitTimeout {
                    target: path.to_string(),
                    state: need.to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

/// Key under which the storefront tracks a form control
fn control_key(dom: &Dom, id: NodeId) -> String {
    let node = dom.node(id);
    node.attr("data-test")
        .or_else(|| node.attr("id"))
        .or_else(|| node.attr("name"))
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl LocatorDriver for MockDriver {
    async fn navigate(&self, url: &str) -> ShopResult<()> {
        self.ensure_open()?;
        let mut state = self.state.lock().await;
        state.navigate(url).map_err(|message| ShopError::Navigation {
            url: url.to_string(),
            message,
        })
    }

    async fn current_url(&self) -> ShopResult<String> {
        self.ensure_open()?;
        let mut state = self.state.lock().await;
        state.settle(Instant::now());
        Ok(state.url())
    }

    async fn count(&self, locator: &LocatorPath) -> ShopResult<usize> {
        let (_, ids) = self.snapshot(locator).await?;
        Ok(ids.len())
    }

    async fn is_visible(&self, locator: &LocatorPath) -> ShopResult<bool> {
        let (dom, ids) = self.snapshot(locator).await?;
        match ids.as_slice() {
            [] => Ok(false),
            [id] => Ok(dom.is_visible(*id)),
            _ => Err(ShopError::locator(
                locator,
                format!("strict mode violation: resolved to {} elements", ids.len()),
            )),
        }
    }

    async fn is_enabled(&self, locator: &LocatorPath) -> ShopResult<bool> {
        self.on_single(locator, Need::Attached, None, |_, dom, id| Ok(dom.is_enabled(id)))
            .await
    }

    async fn text_content(&self, locator: &LocatorPath) -> ShopResult<Option<String>> {
        self.on_single(locator, Need::Attached, None, |_, dom, id| {
            Ok(Some(dom.text_content(id)))
        })
        .await
    }

    async fn get_attribute(
        &self,
        locator: &LocatorPath,
        name: &str,
    ) -> ShopResult<Option<String>> {
        self.on_single(locator, Need::Attached, None, |_, dom, id| {
            Ok(dom.node(id).attr(name).map(str::to_string))
        })
        .await
    }

    async fn click(&self, locator: &LocatorPath, options: &ClickOptions) -> ShopResult<()> {
        let need = if options.force {
            Need::Attached
        } else {
            Need::Actionable
        };
        self.on_single(locator, need, options.timeout, |state, dom, id| {
            match dom.click_target(id) {
                Some(action) => state.click(action.clone(), Instant::now()),
                None => tracing::trace!(locator = %locator, "click without effect"),
            }
            Ok(())
        })
        .await
    }

    async fn fill(&self, locator: &LocatorPath, value: &str) -> ShopResult<()> {
        self.on_single(locator, Need::Actionable, None, |state, dom, id| {
            if !matches!(dom.node(id).tag(), "input" | "textarea") {
                return Err(ShopError::locator(
                    locator,
                    format!("element is a <{}>, not an <input>", dom.node(id).tag()),
                ));
            }
            state.fill(&control_key(dom, id), value);
            Ok(())
        })
        .await
    }

    async fn select_option(&self, locator: &LocatorPath, value: &str) -> ShopResult<Vec<String>> {
        self.on_single(locator, Need::Actionable, None, |state, dom, id| {
            if dom.node(id).tag() != "select" {
                return Err(ShopError::locator(locator, "element is not a <select>"));
            }
            let chosen = dom
                .children(id)
                .filter(|&option| dom.node(option).tag() == "option")
                .find_map(|option| {
                    let option_value = dom
                        .node(option)
                        .attr("value")
                        .map_or_else(|| dom.text_content(option), str::to_string);
                    (option_value == value || dom.text_content(option).trim() == value)
                        .then_some(option_value)
                })
                .ok_or_else(|| ShopError::locator(locator, format!("no option {value:?}")))?;
            state
                .select(&control_key(dom, id), &chosen)
                .map_err(|m| ShopError::locator(locator, m))?;
            Ok(vec![chosen])
        })
        .await
    }

    async fn scroll_into_view(&self, locator: &LocatorPath) -> ShopResult<()> {
        self.on_single(locator, Need::Attached, None, |_, _, _| Ok(()))
            .await
    }

    fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn close(&self) -> ShopResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(session = %self.id, "mock session closed");
        }
        Ok(())
    }
}
