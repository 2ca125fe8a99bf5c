//! Browsing sessions and their document handle.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::driver::LocatorDriver;
use crate::locator::{Locator, LocatorPath, Selector};
use crate::result::{ShopError, ShopResult};

/// Handle to the single active page of a session.
///
/// Cloning shares the underlying driver; any number of page objects may hold
/// a handle to the same document.
#[derive(Clone)]
pub struct Document {
    driver: Arc<dyn LocatorDriver>,
    base_url: Arc<str>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("base_url", &self.base_url)
            .field("driver", &self.driver)
            .finish()
    }
}

impl Document {
    /// Wrap a driver; relative URLs are resolved against `base_url`
    #[must_use]
    pub fn new(driver: Arc<dyn LocatorDriver>, base_url: &str) -> Self {
        Self {
            driver,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// The driver behind this document
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn LocatorDriver> {
        &self.driver
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a path (or pass an absolute URL through)
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        crate::config::join_url(&self.base_url, path)
    }

    /// Document-scoped locator
    #[must_use]
    pub fn locator(&self, selector: &str) -> Locator {
        Locator::new(self.clone(), LocatorPath::new(Selector::parse(selector)))
    }

    /// Document-scoped role locator
    #[must_use]
    pub fn get_by_role(&self, role: &str, name: &str) -> Locator {
        Locator::new(
            self.clone(),
            LocatorPath::new(Selector::role(role, Some(name))),
        )
    }

    /// Navigate to a path or absolute URL
    pub async fn goto(&self, url: &str) -> ShopResult<()> {
        let url = self.url_for(url);
        tracing::debug!(%url, "navigate");
        self.driver.navigate(&url).await
    }

    /// Current URL
    pub async fn current_url(&self) -> ShopResult<String> {
        self.driver.current_url().await
    }

    /// Path component of the current URL (no query or fragment)
    pub async fn current_path(&self) -> ShopResult<String> {
        let url = self.current_url().await?;
        Ok(url_path(&url).to_string())
    }
}

/// Path part of an absolute or relative URL
pub(crate) fn url_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = if url.contains("://") {
        without_scheme
            .find('/')
            .map_or("/", |i| &without_scheme[i..])
    } else {
        without_scheme
    };
    let end = path.find(&['?', '#'][..]).unwrap_or(path.len());
    &path[..end]
}

/// An isolated browsing session (cookies, storage, history) with one document.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    document: Document,
}

impl Session {
    /// Wrap a driver freshly created for this session
    #[must_use]
    pub fn new(driver: Arc<dyn LocatorDriver>, base_url: &str) -> Self {
        Self::with_id(Uuid::new_v4(), driver, base_url)
    }

    /// Wrap a driver under an identifier the launcher already assigned
    #[must_use]
    pub fn with_id(id: Uuid, driver: Arc<dyn LocatorDriver>, base_url: &str) -> Self {
        Self {
            id,
            document: Document::new(driver, base_url),
        }
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The session's document
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Destroy the session. Documents cloned from it keep failing with
    /// [`ShopError::SessionClosed`] afterwards.
    pub async fn close(self) -> ShopResult<()> {
        tracing::debug!(session = %self.id, "closing session");
        self.document.driver().close().await
    }
}

/// Convenience for drivers: the error every call returns after close
pub(crate) fn closed(session: impl fmt::Display) -> ShopError {
    ShopError::SessionClosed {
        session: session.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_path() {
        assert_eq!(url_path("https://www.saucedemo.com/"), "/");
        assert_eq!(url_path("https://www.saucedemo.com"), "/");
        assert_eq!(
            url_path("https://www.saucedemo.com/inventory-item.html?id=4"),
            "/inventory-item.html"
        );
        assert_eq!(url_path("/cart.html#top"), "/cart.html");
    }
}
