//! The shopping scenario against the real site in Chromium
//!
//! Needs a Chromium install and network access:
//!
//! ```text
//! cargo test -p storefront-e2e --features browser --test live -- --ignored
//! ```
//!
//! `STOREFRONT_CONFIG` and the `STOREFRONT_*` variables apply.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use storefront_e2e::prelude::*;

async fn launch() -> (Arc<ChromiumLauncher>, ShopConfig) {
    storefront_e2e::init_tracing();
    let config = ShopConfig::load().expect("valid configuration");
    let launcher = ChromiumLauncher::launch(&config)
        .await
        .expect("chromium starts");
    (Arc::new(launcher), config)
}

async fn shutdown(launcher: Arc<ChromiumLauncher>) {
    if let Ok(launcher) = Arc::try_unwrap(launcher) {
        launcher.shutdown().await.unwrap();
    }
}

#[tokio::test]
#[ignore = "drives the live site in Chromium"]
async fn live_purchase_backpack() {
    let (launcher, config) = launch().await;
    let result = with_pages(launcher.clone(), config, |pages| async move {
        let products = pages.products_page();
        let cards = products.get_product_cards().await?;
        assert_eq!(cards.len(), 6);
        assert_eq!(cards[0].get_name().await?, "Sauce Labs Backpack");
        assert_eq!(cards[0].get_price().await?, "$29.99");

        cards[0].add_to_cart().await?;
        assert_eq!(products.cart_badge().text().await?, "1");
        products.go_to_cart().await?;

        let items = pages.cart_page().get_cart_items().await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get_quantity().await?, 1);

        pages.cart_page().checkout().await?;
        let checkout = pages.checkout_form();
        checkout.fill_customer_info("John", "Doe", "12345").await?;
        checkout.continue_checkout().await?;
        checkout.finish_order().await?;
        assert_eq!(
            checkout.complete_header().text().await?,
            "Thank you for your order!"
        );
        Ok(())
    })
    .await;
    shutdown(launcher).await;
    result.unwrap();
}

#[tokio::test]
#[ignore = "drives the live site in Chromium"]
async fn live_sessions_are_isolated() {
    let (launcher, config) = launch().await;
    let first = with_pages(launcher.clone(), config.clone(), |pages| async move {
        pages
            .products_page()
            .add_product_to_cart("Sauce Labs Onesie")
            .await?;
        pages.products_page().get_cart_count().await
    })
    .await;
    let second = with_pages(launcher.clone(), config, |pages| async move {
        pages.products_page().get_cart_count().await
    })
    .await;
    shutdown(launcher).await;
    assert_eq!(first.unwrap(), 1);
    assert_eq!(second.unwrap(), 0);
}
