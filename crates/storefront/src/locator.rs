//! Locator abstraction for element selection and interaction.
//!
//! # Design Philosophy
//!
//! - **Descriptions, not handles**: a [`LocatorPath`] is an ordered scope chain
//!   of [`Selector`] steps. It is re-resolved by the driver on every operation,
//!   so a locator survives navigation and DOM mutation.
//! - **Scoping, not ownership**: a child locator is its parent's chain plus one
//!   more step.
//! - **Strict actions**: reads and actions fail when a chain matches more than
//!   one node; only [`Locator::count`] and [`Locator::all`] accept many.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::result::ShopResult;
use crate::session::Document;
use crate::wait::ElementState;

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., `[data-test="username"]`)
    Css {
        /// Selector text
        value: String,
    },
    /// XPath expression (e.g., `//input[@data-test="firstName"]`)
    #[serde(rename = "xpath")]
    XPath {
        /// Expression text
        value: String,
    },
    /// ARIA role with an optional accessible name
    Role {
        /// Role name, e.g. `button`
        role: String,
        /// Accessible name to look for: a case-insensitive substring of the
        /// whitespace-normalised name
        name: Option<String>,
    },
    /// The n-th match (zero-based, document order) of the chain so far
    Nth {
        /// Index
        index: usize,
    },
}

impl Selector {
    /// Parse a selector string the way Playwright does: an explicit `css=` or
    /// `xpath=` prefix wins, otherwise anything starting with `//`, `..` or
    /// `(` is XPath and the rest is CSS.
    #[must_use]
    pub fn parse(selector: &str) -> Self {
        let selector = selector.trim();
        if let Some(css) = selector.strip_prefix("css=") {
            return Self::css(css);
        }
        if let Some(xpath) = selector.strip_prefix("xpath=") {
            return Self::xpath(xpath);
        }
        if selector.starts_with("//") || selector.starts_with("..") || selector.starts_with('(') {
            Self::xpath(selector)
        } else {
            Self::css(selector)
        }
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            value: selector.into(),
        }
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath {
            value: expression.into(),
        }
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: Option<&str>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.map(str::to_string),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css { value } => f.write_str(value),
            Self::XPath { value } => write!(f, "xpath={value}"),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={name:?}]"),
            Self::Nth { index } => write!(f, "nth={index}"),
        }
    }
}

/// Scope chain describing zero or more DOM nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorPath {
    steps: Vec<Selector>,
}

impl LocatorPath {
    /// Empty chain (the document itself)
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Chain with a single step
    #[must_use]
    pub fn new(step: Selector) -> Self {
        Self { steps: vec![step] }
    }

    /// This chain extended by one step
    #[must_use]
    pub fn child(&self, step: Selector) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// Steps in resolution order
    #[must_use]
    pub fn steps(&self) -> &[Selector] {
        &self.steps
    }

    /// Check whether the chain is empty
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for LocatorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str(":root");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Options for click actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOptions {
    /// Skip the visible/enabled actionability checks
    pub force: bool,
    /// Override the driver's default timeout
    pub timeout: Option<Duration>,
}

impl ClickOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set force mode
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A locator bound to a document.
///
/// Cloning is cheap; the document handle is shared.
#[derive(Debug, Clone)]
pub struct Locator {
    path: LocatorPath,
    document: Document,
}

impl Locator {
    /// Bind a chain to a document
    #[must_use]
    pub fn new(document: Document, path: LocatorPath) -> Self {
        Self { path, document }
    }

    /// The selector chain
    #[must_use]
    pub const fn path(&self) -> &LocatorPath {
        &self.path
    }

    /// The owning document
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Descendant locator, scoped to this one
    #[must_use]
    pub fn locator(&self, selector: &str) -> Self {
        self.child(Selector::parse(selector))
    }

    /// Descendant with the given ARIA role whose accessible name contains
    /// `name`, ignoring case
    #[must_use]
    pub fn get_by_role(&self, role: &str, name: &str) -> Self {
        self.child(Selector::role(role, Some(name)))
    }

    /// The n-th match of this locator
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.child(Selector::Nth { index })
    }

    /// The first match of this locator
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    fn child(&self, step: Selector) -> Self {
        Self {
            path: self.path.child(step),
            document: self.document.clone(),
        }
    }

    /// Number of nodes currently matching
    pub async fn count(&self) -> ShopResult<usize> {
        self.document.driver().count(&self.path).await
    }

    /// One locator per current match, in document order.
    ///
    /// Each entry is an `nth` description of this chain, not a node handle.
    pub async fn all(&self) -> ShopResult<Vec<Self>> {
        let count = self.count().await?;
        tracing::debug!(locator = %self.path, count, "resolved all matches");
        Ok((0..count).map(|i| self.nth(i)).collect())
    }

    /// Point-in-time visibility
    pub async fn is_visible(&self) -> ShopResult<bool> {
        self.document.driver().is_visible(&self.path).await
    }

    /// Inverse of [`Locator::is_visible`]
    pub async fn is_hidden(&self) -> ShopResult<bool> {
        Ok(!self.is_visible().await?)
    }

    /// Point-in-time enablement
    pub async fn is_enabled(&self) -> ShopResult<bool> {
        self.document.driver().is_enabled(&self.path).await
    }

    /// Inverse of [`Locator::is_enabled`]
    pub async fn is_disabled(&self) -> ShopResult<bool> {
        Ok(!self.is_enabled().await?)
    }

    /// Raw `textContent`
    pub async fn text_content(&self) -> ShopResult<Option<String>> {
        self.document.driver().text_content(&self.path).await
    }

    /// Trimmed text content, empty when the node has none
    pub async fn text(&self) -> ShopResult<String> {
        Ok(self
            .text_content()
            .await?
            .map(|text| text.trim().to_string())
            .unwrap_or_default())
    }

    /// Attribute value, if present
    pub async fn get_attribute(&self, name: &str) -> ShopResult<Option<String>> {
        self.document.driver().get_attribute(&self.path, name).await
    }

    /// Click with default options
    pub async fn click(&self) -> ShopResult<()> {
        self.click_with(ClickOptions::default()).await
    }

    /// Click with explicit options
    pub async fn click_with(&self, options: ClickOptions) -> ShopResult<()> {
        tracing::debug!(locator = %self.path, force = options.force, "click");
        self.document.driver().click(&self.path, &options).await
    }

    /// Replace the value of an input
    pub async fn fill(&self, value: &str) -> ShopResult<()> {
        tracing::debug!(locator = %self.path, "fill");
        self.document.driver().fill(&self.path, value).await
    }

    /// Select an option of a `<select>` by value or label
    pub async fn select_option(&self, value: &str) -> ShopResult<Vec<String>> {
        tracing::debug!(locator = %self.path, value, "select option");
        self.document.driver().select_option(&self.path, value).await
    }

    /// Scroll the node into the viewport
    pub async fn scroll_into_view(&self) -> ShopResult<()> {
        self.document.driver().scroll_into_view(&self.path).await
    }

    /// Wait for the given state; `None` uses the driver's default timeout
    pub async fn wait_for(&self, state: ElementState, timeout: Option<Duration>) -> ShopResult<()> {
        tracing::debug!(locator = %self.path, %state, ?timeout, "wait");
        self.document
            .driver()
            .wait_for(&self.path, state, timeout)
            .await
    }
}
