//! Page Object Model support
//!
//! Two capability traits instead of a class hierarchy:
//!
//! - [`Component`]: has a root scope and a document handle. Everything it
//!   locates is a descendant of its root.
//! - [`Page`]: has a document handle. Everything it locates is document-wide.
//!
//! Collections of unknown size (product cards, cart rows) are enumerated with
//! [`Component::get_components`] / [`Page::get_list_of_components`]. The list
//! is built fresh on every call and nothing caches it, so callers re-fetch
//! after any mutation of the page.
//!
//! # Example
//!
//! ```ignore
//! struct Row { root: Locator, document: Document }
//!
//! impl Component for Row {
//!     fn from_root(root: Locator, document: Document) -> Self { Self { root, document } }
//!     fn root(&self) -> &Locator { &self.root }
//!     fn document(&self) -> &Document { &self.document }
//! }
//!
//! let rows: Vec<Row> = page.get_list_of_components("tr.row").await?;
//! ```

use async_trait::async_trait;
use std::time::Duration;

use crate::locator::{ClickOptions, Locator};
use crate::result::ShopResult;
use crate::session::Document;
use crate::wait::ElementState;

/// A scoped wrapper around one DOM subtree.
#[async_trait]
pub trait Component: Send + Sync + Sized {
    /// Construct from a root scope; used by enumeration
    fn from_root(root: Locator, document: Document) -> Self;

    /// Root scope of this component
    fn root(&self) -> &Locator;

    /// Owning document, for page-wide lookups
    fn document(&self) -> &Document;

    /// Locator relative to the root
    fn locator(&self, selector: &str) -> Locator {
        self.root().locator(selector)
    }

    /// Whether the root is currently visible
    async fn is_visible(&self) -> ShopResult<bool> {
        self.root().is_visible().await
    }

    /// Whether the root is currently enabled
    async fn is_enabled(&self) -> ShopResult<bool> {
        self.root().is_enabled().await
    }

    /// Wait for the root to become visible
    async fn wait_for_visible(&self, timeout: Option<Duration>) -> ShopResult<()> {
        self.root().wait_for(ElementState::Visible, timeout).await
    }

    /// Wait for the root to become hidden
    async fn wait_for_hidden(&self, timeout: Option<Duration>) -> ShopResult<()> {
        self.root().wait_for(ElementState::Hidden, timeout).await
    }

    /// One `C` per node under the root matching `selector`, in document order
    async fn get_components<C: Component>(&self, selector: &str) -> ShopResult<Vec<C>> {
        self.get_components_with(selector, C::from_root).await
    }

    /// Like [`Component::get_components`] with an explicit factory
    async fn get_components_with<C, F>(&self, selector: &str, factory: F) -> ShopResult<Vec<C>>
    where
        C: Send,
        F: Fn(Locator, Document) -> C + Send,
    {
        let matches = self.locator(selector).all().await?;
        Ok(matches
            .into_iter()
            .map(|root| factory(root, self.document().clone()))
            .collect())
    }

    /// Scroll the root into view
    async fn scroll_into_view(&self) -> ShopResult<()> {
        self.root().scroll_into_view().await
    }

    /// Click the root
    async fn click(&self, options: ClickOptions) -> ShopResult<()> {
        self.root().click_with(options).await
    }

    /// Trimmed text of the root, empty when there is none
    async fn get_text(&self) -> ShopResult<String> {
        self.root().text().await
    }
}

/// A wrapper around the whole document.
#[async_trait]
pub trait Page: Send + Sync {
    /// The document this page drives
    fn document(&self) -> &Document;

    /// Canonical path of this page, when it has one
    fn path(&self) -> Option<&str> {
        None
    }

    /// Name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Document-scoped locator
    fn locator(&self, selector: &str) -> Locator {
        self.document().locator(selector)
    }

    /// Navigate to [`Page::path`]; pages without a path stay put
    async fn open(&self) -> ShopResult<()> {
        if let Some(path) = self.path() {
            tracing::info!(page = self.page_name(), path, "open");
            self.document().goto(path).await?;
        }
        Ok(())
    }

    /// Whether the current URL path is [`Page::path`]; query and fragment
    /// are ignored
    async fn is_current(&self) -> ShopResult<bool> {
        match self.path() {
            Some(path) => Ok(self.document().current_path().await? == path),
            None => Ok(false),
        }
    }

    /// One `C` per node in the document matching `selector`, in document order
    async fn get_list_of_components<C: Component>(&self, selector: &str) -> ShopResult<Vec<C>> {
        self.get_list_of_components_with(selector, C::from_root)
            .await
    }

    /// Like [`Page::get_list_of_components`] with an explicit factory
    async fn get_list_of_components_with<C, F>(
        &self,
        selector: &str,
        factory: F,
    ) -> ShopResult<Vec<C>>
    where
        C: Send,
        F: Fn(Locator, Document) -> C + Send,
    {
        let matches = self.locator(selector).all().await?;
        Ok(matches
            .into_iter()
            .map(|root| factory(root, self.document().clone()))
            .collect())
    }
}
