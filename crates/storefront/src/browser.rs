//! Real Chromium over CDP (feature `browser`).
//!
//! [`ChromiumLauncher`] starts one Chromium per test run. Every
//! [`BrowserLauncher::new_session`] creates a fresh browser context (its own
//! cookies and storage) with a single page in it. Locator chains are resolved
//! in the page by a resolver script that mirrors the in-memory storefront's
//! selector semantics: CSS, XPath (relative to the scope), role with a
//! case-insensitive name match, nth.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::ShopConfig;
use crate::driver::{BrowserLauncher, LocatorDriver};
use crate::locator::{ClickOptions, LocatorPath};
use crate::result::{ShopError, ShopResult};
use crate::session::{closed, Session};

/// In-page resolver: `(path, op, arg, need) => { status, value, message }`.
///
/// `status` is `ok`, `pending` (no single match meeting `need` yet; the
/// driver polls) or `error` (strict-mode violation, bad selector, wrong
/// element type).
const RESOLVER: &str = r#"(path, op, arg, need) => {
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const visible = (el) => {
    if (!el.isConnected || el.nodeType !== 1) return false;
    const style = getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
  };
  const enabled = (el) => !el.disabled && !el.closest('fieldset[disabled]');
  const implicitRole = (el) => {
    const tag = el.tagName.toLowerCase();
    const type = (el.getAttribute('type') || 'text').toLowerCase();
    if (tag === 'button') return 'button';
    if (tag === 'input') {
      if (['submit', 'button', 'reset', 'image'].includes(type)) return 'button';
      if (type === 'checkbox') return 'checkbox';
      if (['text', 'email', 'search', 'tel', 'url'].includes(type)) return 'textbox';
      return null;
    }
    if (tag === 'textarea') return 'textbox';
    if (tag === 'a' && el.hasAttribute('href')) return 'link';
    if (tag === 'select') return 'combobox';
    if (tag === 'option') return 'option';
    if (tag === 'img') return 'img';
    if (/^h[1-6]$/.test(tag)) return 'heading';
    return null;
  };
  const roleOf = (el) => el.getAttribute('role') || implicitRole(el);
  const nameOf = (el) => norm(
    el.getAttribute('aria-label')
      || (el.tagName === 'INPUT' ? el.value : el.tagName === 'IMG' ? el.alt : el.textContent));
  const ordered = (nodes) => nodes.sort((a, b) =>
    a === b ? 0 : (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING ? -1 : 1));
  const step = (scopes, sel) => {
    if (sel.kind === 'nth') return sel.index < scopes.length ? [scopes[sel.index]] : [];
    const out = new Set();
    for (const scope of scopes) {
      if (sel.kind === 'css') {
        scope.querySelectorAll(sel.value).forEach((el) => out.add(el));
      } else if (sel.kind === 'xpath') {
        const expr = scope !== document && sel.value.startsWith('/') ? '.' + sel.value : sel.value;
        const found = document.evaluate(expr, scope, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
        for (let i = 0; i < found.snapshotLength; i++) out.add(found.snapshotItem(i));
      } else if (sel.kind === 'role') {
        const want = sel.name == null ? null : norm(sel.name).toLowerCase();
        scope.querySelectorAll('*').forEach((el) => {
          if (roleOf(el) !== sel.role || !visible(el)) return;
          if (want !== null && !nameOf(el).toLowerCase().includes(want)) return;
          out.add(el);
        });
      }
    }
    return ordered(Array.from(out));
  };
  const ok = (value) => ({ status: 'ok', value });
  const fail = (message) => ({ status: 'error', message });

  let nodes = [document];
  try {
    for (const sel of path) nodes = step(nodes, sel);
  } catch (e) {
    return fail(String(e));
  }
  if (op === 'count') return ok(nodes.length);
  if (nodes.length > 1) return fail(`strict mode violation: resolved to ${nodes.length} elements`);
  if (op === 'visible') return ok(nodes.length === 1 && visible(nodes[0]));
  if (nodes.length === 0) return { status: 'pending' };
  const el = nodes[0];
  if (need === 'actionable' && !(visible(el) && enabled(el))) return { status: 'pending' };

  const setValue = (proto, value) => {
    Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, value);
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
  };
  switch (op) {
    case 'enabled': return ok(enabled(el));
    case 'text': return ok(el.textContent);
    case 'attr': return ok(el.getAttribute(arg));
    case 'scroll':
      el.scrollIntoView({ block: 'center' });
      return ok(null);
    case 'click':
      el.scrollIntoView({ block: 'center' });
      el.click();
      return ok(null);
    case 'fill':
      if (el.tagName === 'INPUT') setValue(HTMLInputElement.prototype, arg);
      else if (el.tagName === 'TEXTAREA') setValue(HTMLTextAreaElement.prototype, arg);
      else return fail(`element is a <${el.tagName.toLowerCase()}>, not an <input>`);
      return ok(null);
    case 'select': {
      if (el.tagName !== 'SELECT') return fail('element is not a <select>');
      const option = Array.from(el.options).find((o) => o.value === arg || norm(o.textContent) === arg);
      if (!option) return fail(`no option ${JSON.stringify(arg)}`);
      setValue(HTMLSelectElement.prototype, option.value);
      return ok([option.value]);
    }
    default: return fail(`unknown operation ${op}`);
  }
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReplyStatus {
    Ok,
    Pending,
    Error,
}

#[derive(Debug, Deserialize)]
struct ScriptReply {
    status: ReplyStatus,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    message: String,
}

/// What the single match must satisfy before the script acts on it
#[derive(Debug, Clone, Copy)]
enum Need {
    Attached,
    Actionable,
}

impl Need {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Attached => "attached",
            Self::Actionable => "actionable",
        }
    }
}

/// Call expression for one resolver invocation
fn script(path: &LocatorPath, op: &str, arg: &str, need: Need) -> ShopResult<String> {
    Ok(format!(
        "({RESOLVER})({}, {}, {}, {})",
        serde_json::to_string(path)?,
        serde_json::to_string(op)?,
        serde_json::to_string(arg)?,
        serde_json::to_string(need.as_str())?,
    ))
}

fn launch_error(err: impl ToString) -> ShopError {
    ShopError::BrowserLaunch {
        message: err.to_string(),
    }
}

/// Chromium launched from a [`ShopConfig`]
#[derive(Debug)]
pub struct ChromiumLauncher {
    config: ShopConfig,
    browser: Arc<Mutex<Browser>>,
    handler: JoinHandle<()>,
}

impl ChromiumLauncher {
    /// Start Chromium. Honors `headless`, `sandbox` and `chromium_path`.
    pub async fn launch(config: &ShopConfig) -> ShopResult<Self> {
        config.validate()?;
        let mut builder = BrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(launch_error)?;

        let (browser, mut handler) = Browser::launch(cdp_config).await.map_err(launch_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        tracing::info!(headless = config.headless, "chromium launched");
        Ok(Self {
            config: config.clone(),
            browser: Arc::new(Mutex::new(browser)),
            handler,
        })
    }

    /// Configuration the browser was launched with
    #[must_use]
    pub const fn config(&self) -> &ShopConfig {
        &self.config
    }

    /// Close the browser and stop its event loop
    pub async fn shutdown(self) -> ShopResult<()> {
        let result = self.browser.lock().await.close().await;
        self.handler.abort();
        tracing::info!("chromium closed");
        result.map(|_| ()).map_err(launch_error)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn new_session(&self) -> ShopResult<Session> {
        let (context, page) = {
            let mut browser = self.browser.lock().await;
            let context = browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await
                .map_err(launch_error)?;
            let target = CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(context.clone())
                .build()
                .map_err(launch_error)?;
            let page = browser.new_page(target).await.map_err(launch_error)?;
            (context, page)
        };
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "chromium session opened");
        let driver = ChromiumDriver {
            id,
            page,
            context,
            browser: Arc::clone(&self.browser),
            closed: AtomicBool::new(false),
            default_timeout: self.config.default_timeout(),
            poll_interval: self.config.poll_interval(),
        };
        Ok(Session::with_id(id, Arc::new(driver), &self.config.base_url))
    }
}

/// One page in its own browser context
#[derive(Debug)]
struct ChromiumDriver {
    id: Uuid,
    page: CdpPage,
    context: BrowserContextId,
    browser: Arc<Mutex<Browser>>,
    closed: AtomicBool,
    default_timeout: Duration,
    poll_interval: Duration,
}

impl ChromiumDriver {
    fn ensure_open(&self) -> ShopResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(closed(self.id))
        } else {
            Ok(())
        }
    }

    async fn eval(&self, path: &LocatorPath, op: &str, arg: &str, need: Need) -> ShopResult<ScriptReply> {
        self.ensure_open()?;
        let expression = script(path, op, arg, need)?;
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| ShopError::locator(path, e.to_string()))?;
        result
            .into_value()
            .map_err(|e| ShopError::locator(path, e.to_string()))
    }

    /// Run `op` once; no waiting
    async fn query(&self, path: &LocatorPath, op: &str) -> ShopResult<Value> {
        let reply = self.eval(path, op, "", Need::Attached).await?;
        match reply.status {
            ReplyStatus::Ok => Ok(reply.value),
            ReplyStatus::Pending => Err(ShopError::locator(path, "no element matches")),
            ReplyStatus::Error => Err(ShopError::locator(path, reply.message)),
        }
    }

    /// Poll `op` until a single match meets `need`
    async fn on_single(
        &self,
        path: &LocatorPath,
        op: &str,
        arg: &str,
        need: Need,
        timeout: Option<Duration>,
    ) -> ShopResult<Value> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let deadline = Instant::now() + timeout;
        loop {
            let reply = self.eval(path, op, arg, need).await?;
            match reply.status {
                ReplyStatus::Ok => return Ok(reply.value),
                ReplyStatus::Error => return Err(ShopError::locator(path, reply.message)),
                ReplyStatus::Pending => {}
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ShopError::WaitTimeout {
                    target: path.to_string(),
                    state: need.as_str().to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> ShopResult<T> {
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl LocatorDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> ShopResult<()> {
        self.ensure_open()?;
        tracing::debug!(session = %self.id, url, "navigate");
        self.page
            .goto(url)
            .await
            .map_err(|e| ShopError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> ShopResult<String> {
        self.ensure_open()?;
        let url = self.page.url().await.map_err(|e| ShopError::Navigation {
            url: String::new(),
            message: e.to_string(),
        })?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn count(&self, locator: &LocatorPath) -> ShopResult<usize> {
        decode(self.query(locator, "count").await?)
    }

    async fn is_visible(&self, locator: &LocatorPath) -> ShopResult<bool> {
        decode(self.query(locator, "visible").await?)
    }

    async fn is_enabled(&self, locator: &LocatorPath) -> ShopResult<bool> {
        decode(self.on_single(locator, "enabled", "", Need::Attached, None).await?)
    }

    async fn text_content(&self, locator: &LocatorPath) -> ShopResult<Option<String>> {
        decode(self.on_single(locator, "text", "", Need::Attached, None).await?)
    }

    async fn get_attribute(&self, locator: &LocatorPath, name: &str) -> ShopResult<Option<String>> {
        decode(self.on_single(locator, "attr", name, Need::Attached, None).await?)
    }

    async fn click(&self, locator: &LocatorPath, options: &ClickOptions) -> ShopResult<()> {
        let need = if options.force {
            Need::Attached
        } else {
            Need::Actionable
        };
        self.on_single(locator, "click", "", need, options.timeout).await?;
        Ok(())
    }

    async fn fill(&self, locator: &LocatorPath, value: &str) -> ShopResult<()> {
        self.on_single(locator, "fill", value, Need::Actionable, None).await?;
        Ok(())
    }

    async fn select_option(&self, locator: &LocatorPath, value: &str) -> ShopResult<Vec<String>> {
        decode(self.on_single(locator, "select", value, Need::Actionable, None).await?)
    }

    async fn scroll_into_view(&self, locator: &LocatorPath) -> ShopResult<()> {
        self.on_single(locator, "scroll", "", Need::Attached, None).await?;
        Ok(())
    }

    fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn close(&self) -> ShopResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!(session = %self.id, "chromium session closed");
        if let Err(err) = self.page.clone().close().await {
            tracing::warn!(session = %self.id, error = %err, "closing page");
        }
        self.browser
            .lock()
            .await
            .dispose_browser_context(self.context.clone())
            .await
            .map_err(launch_error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::Selector;

    #[test]
    fn test_script_embeds_json_arguments() {
        let path = LocatorPath::root()
            .child(Selector::css(r#"[data-test="inventory-item"]"#))
            .child(Selector::Nth { index: 0 })
            .child(Selector::role("button", Some("Add to cart")));
        let call = script(&path, "fill", "O'Brien \"Jr\"", Need::Actionable).unwrap();
        assert!(call.starts_with("((path, op, arg, need) =>"));
        assert!(call.contains(r#"{"kind":"nth","index":0}"#));
        assert!(call.contains(r#"{"kind":"role","role":"button","name":"Add to cart"}"#));
        assert!(call.contains(r#""O'Brien \"Jr\"""#));
        assert!(call.ends_with(r#", "actionable")"#));
    }

    #[test]
    fn test_reply_decoding() {
        let reply: ScriptReply =
            serde_json::from_str(r#"{"status":"error","message":"strict mode violation"}"#).unwrap();
        assert_eq!(reply.status, ReplyStatus::Error);
        assert_eq!(reply.value, Value::Null);

        let reply: ScriptReply = serde_json::from_str(r#"{"status":"ok","value":["az"]}"#).unwrap();
        assert_eq!(decode::<Vec<String>>(reply.value).unwrap(), vec!["az"]);
    }
}
