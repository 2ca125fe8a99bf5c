//! storefront-e2e: page objects and fixtures for the Sauce Labs demo shop
//!
//! Tests drive the shop through typed page objects over an abstract locator
//! driver, so the same suite runs against a real Chromium (feature
//! `browser`) or the in-memory storefront in [`mock`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  test body ──► Pages ──► LoginForm / ProductsPage / ...         │
//! │                  │            │                                 │
//! │                  ▼            ▼                                 │
//! │              Document ──► Locator (selector chain)              │
//! │                  │                                              │
//! │                  ▼                                              │
//! │            LocatorDriver ◄── ChromiumDriver | MockDriver        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use storefront_e2e::prelude::*;
//!
//! #[tokio::test]
//! async fn adds_backpack() -> ShopResult<()> {
//!     with_pages(Arc::new(MockBrowser::new()), ShopConfig::default(), |pages| async move {
//!         pages.products_page().add_product_to_cart("Sauce Labs Backpack").await?;
//!         assert_eq!(pages.products_page().get_cart_count().await?, 1);
//!         Ok(())
//!     })
//!     .await
//! }
//! ```

#![warn(missing_docs)]

mod config;
mod driver;
mod fixture;
mod locator;
mod manager;
mod money;
mod page_object;
mod result;
mod session;
mod wait;

#[cfg(feature = "browser")]
mod browser;

pub mod logging;
pub mod mock;
pub mod pages;

pub use config::{Credentials, ShopConfig, CONFIG_PATH_ENV, DEFAULT_BASE_URL};
pub use driver::{BrowserLauncher, LocatorDriver};
pub use fixture::{
    run_fixture, step, with_authenticated_page, with_pages, AuthenticatedPage, Fixture,
    FixtureState, PagesFixture,
};
pub use locator::{ClickOptions, Locator, LocatorPath, Selector};
pub use logging::{init_tracing, LogFormat};
pub use manager::Pages;
pub use mock::MockBrowser;
pub use money::{parse_amount, round_to_cents, Price};
pub use page_object::{Component, Page};
pub use pages::{
    CartItem, CheckoutForm, LoginForm, ProductCard, ProductsPage, ShoppingCartPage, SortOption,
};
pub use result::{ErrorKind, ShopError, ShopResult};
pub use session::{Document, Session};
pub use wait::{
    ElementState, WaitOptions, WaitResult, Waiter, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};

#[cfg(feature = "browser")]
pub use browser::ChromiumLauncher;

/// Everything a test usually needs
pub mod prelude {
    pub use super::fixture::{run_fixture, step, with_authenticated_page, with_pages, Fixture};
    pub use super::page_object::{Component, Page};
    pub use super::{
        BrowserLauncher, CartItem, CheckoutForm, Credentials, Document, ElementState, ErrorKind,
        Locator, LoginForm, MockBrowser, Pages, Price, ProductCard, ProductsPage, Session,
        ShopConfig, ShopError, ShopResult, ShoppingCartPage, SortOption,
    };

    #[cfg(feature = "browser")]
    pub use super::ChromiumLauncher;
}
