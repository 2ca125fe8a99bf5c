//! Shopping scenarios against the in-memory storefront
//!
//! Every test gets a fresh signed-in session from the pages fixture.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use storefront_e2e::mock::{COMPLETE_HEADER, COMPLETE_TEXT};
use storefront_e2e::prelude::*;

const BASE_URL: &str = "http://shop.test";

/// Launcher and fixture config built from one `ShopConfig`
fn shop() -> (Arc<dyn BrowserLauncher>, ShopConfig) {
    storefront_e2e::init_tracing();
    let config = ShopConfig::default()
        .with_base_url(BASE_URL)
        .with_default_timeout(2_000);
    (Arc::new(MockBrowser::from_config(&config)), config)
}

// ============================================================================
// End-to-end purchase
// ============================================================================

#[tokio::test]
async fn test_purchase_backpack() {
    let (launcher, config) = shop();
    with_pages(launcher, config, |pages| async move {
        let products = pages.products_page();

        let cards = step("list products", products.get_product_cards()).await?;
        assert_eq!(cards.len(), 6);
        let first = &cards[0];
        assert_eq!(first.get_name().await?, "Sauce Labs Backpack");
        assert_eq!(first.get_price().await?, "$29.99");
        assert!(first.get_description().await?.starts_with("carry.allTheThings()"));

        step("add to cart", first.add_to_cart()).await?;
        assert!(first.is_added_to_cart().await?);
        assert_eq!(products.cart_badge().text().await?, "1");

        step("remove from cart", first.remove_from_cart()).await?;
        assert!(!first.is_added_to_cart().await?);
        assert!(products.cart_badge().is_hidden().await?);

        step("add again", first.add_to_cart()).await?;
        step("open cart", products.go_to_cart()).await?;

        let cart = pages.cart_page();
        let items = cart.get_cart_items().await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get_name().await?, "Sauce Labs Backpack");
        assert_eq!(items[0].get_price().await?, "$29.99");
        assert_eq!(items[0].get_quantity().await?, 1);

        step("checkout", cart.checkout()).await?;
        let checkout = pages.checkout_form();
        step(
            "customer info",
            checkout.fill_customer_info("John", "Doe", "12345"),
        )
        .await?;
        step("continue", checkout.continue_checkout()).await?;
        step("finish", checkout.finish_order()).await?;
        assert_eq!(checkout.complete_header().text().await?, COMPLETE_HEADER);
        assert_eq!(checkout.complete_text().text().await?, COMPLETE_TEXT);

        step("back home", checkout.return_to_products()).await?;
        products
            .sort_dropdown()
            .wait_for(ElementState::Visible, None)
            .await?;
        assert_eq!(products.get_cart_count().await?, 0);
        Ok(())
    })
    .await
    .unwrap();
}

// ============================================================================
// Inventory
// ============================================================================

async fn product_rows(products: &ProductsPage) -> ShopResult<Vec<(String, String, String)>> {
    let mut rows = Vec::new();
    for card in products.get_product_cards().await? {
        rows.push((
            card.get_name().await?,
            card.get_price().await?,
            card.get_description().await?,
        ));
    }
    Ok(rows)
}

async fn cart_rows(cart: &ShoppingCartPage) -> ShopResult<Vec<(String, String, String)>> {
    let mut rows = Vec::new();
    for item in cart.get_cart_items().await? {
        rows.push((
            item.get_name().await?,
            item.get_price().await?,
            item.get_description().await?,
        ));
    }
    Ok(rows)
}

#[tokio::test]
async fn test_product_enumeration_is_idempotent() {
    let (launcher, config) = shop();
    with_pages(launcher, config, |pages| async move {
        let products = pages.products_page();
        let first = product_rows(&products).await?;
        let second = product_rows(&products).await?;
        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
        assert!(first.iter().all(|(_, price, desc)| price.starts_with('$') && !desc.is_empty()));
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_add_remove_symmetry() {
    let (launcher, config) = shop();
    with_pages(launcher, config, |pages| async move {
        let products = pages.products_page();
        products.add_product_to_cart("Sauce Labs Onesie").await?;
        let before = products.get_cart_count().await?;
        assert_eq!(before, 1);

        for card in products.get_product_cards().await? {
            if card.is_added_to_cart().await? {
                continue;
            }
            card.add_to_cart().await?;
            assert!(card.is_added_to_cart().await?);
            assert_eq!(products.get_cart_count().await?, before + 1);
            card.remove_from_cart().await?;
            assert!(!card.is_added_to_cart().await?);
            assert_eq!(products.get_cart_count().await?, before);
        }

        let onesie = products
            .find_product_by_name("Sauce Labs Onesie")
            .await?
            .expect("onesie is listed");
        assert!(onesie.is_added_to_cart().await?);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_unknown_product() {
    let (launcher, config) = shop();
    with_pages(launcher, config, |pages| async move {
        let products = pages.products_page();
        assert!(products.find_product_by_name("nonexistent").await?.is_none());

        let err = products
            .add_product_to_cart("nonexistent")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = products.get_product_by_index(6).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_sort_by_price() {
    let (launcher, config) = shop();
    with_pages(launcher, config, |pages| async move {
        let products = pages.products_page();
        products.sort_by(SortOption::PriceLowHigh).await?;
        let mut prices = Vec::new();
        for card in products.get_product_cards().await? {
            prices.push(card.get_price_value().await?);
        }
        let mut sorted = prices.clone();
        sorted.sort();
        assert_eq!(prices, sorted);
        assert_eq!(prices[0].to_string(), "$7.99");

        products.sort_products("za").await?;
        let first = products.get_product_by_index(0).await?;
        assert_eq!(first.get_name().await?, "Test.allTheThings() T-Shirt (Red)");
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_product_details() {
    let (launcher, config) = shop();
    with_pages(launcher, config, |pages| async move {
        let products = pages.products_page();
        let card = products
            .find_product_by_name("Sauce Labs Fleece Jacket")
            .await?
            .expect("jacket is listed");
        card.open_details().await?;
        assert_eq!(
            pages.document().current_path().await?,
            "/inventory-item.html"
        );
        assert_eq!(
            pages.document().current_url().await?,
            format!("{BASE_URL}/inventory-item.html?id=5")
        );
        Ok(())
    })
    .await
    .unwrap();
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_cart_total() {
    let (launcher, config) = shop();
    with_pages(launcher, config, |pages| async move {
        let products = pages.products_page();
        products.add_product_to_cart("Sauce Labs Backpack").await?;
        products.add_product_to_cart("Sauce Labs Bike Light").await?;
        assert_eq!(products.get_cart_count().await?, 2);

        let cart = pages.cart_page();
        cart.open().await?;
        assert_eq!(cart.get_item_count().await?, 2);
        assert_eq!(cart.get_total_price().await?, 39.98);

        cart.remove_item("Sauce Labs Bike Light").await?;
        assert_eq!(cart.get_total().await?, "$29.99".parse::<Price>()?);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_cart_enumeration_is_idempotent() {
    let (launcher, config) = shop();
    with_pages(launcher, config, |pages| async move {
        let products = pages.products_page();
        products.add_product_to_cart("Sauce Labs Bolt T-Shirt").await?;
        products.add_product_to_cart("Sauce Labs Backpack").await?;

        let cart = pages.cart_page();
        cart.open().await?;
        let first = cart_rows(&cart).await?;
        let second = cart_rows(&cart).await?;
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(first[0].0, "Sauce Labs Bolt T-Shirt");
        assert_eq!(first[0].1, "$15.99");
        Ok(())
    })
    .await
    .unwrap();
}

// ============================================================================
// Waiting
// ============================================================================

#[tokio::test]
async fn test_wait_for_missing_element_times_out() {
    let (launcher, config) = shop();
    with_authenticated_page(launcher, config, |document| async move {
        let missing = document.locator(r#"[data-test="never-rendered"]"#);
        let started = Instant::now();
        let err = missing
            .wait_for(ElementState::Visible, Some(Duration::from_millis(100)))
            .await
            .unwrap_err();
        let elapsed = started.elapsed();
        assert_eq!(err.kind(), ErrorKind::WaitTimeout);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(1_000), "took {elapsed:?}");
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_wait_for_hidden_times_out_while_visible() {
    let (launcher, config) = shop();
    with_pages(launcher, config, |pages| async move {
        let card = pages.products_page().get_product_by_index(0).await?;
        let started = Instant::now();
        let err = card
            .wait_for_hidden(Some(Duration::from_millis(100)))
            .await
            .unwrap_err();
        let elapsed = started.elapsed();
        assert_eq!(err.kind(), ErrorKind::WaitTimeout);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(1_000), "took {elapsed:?}");
        assert!(card.is_visible().await?);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_slow_ui_is_awaited() {
    let browser = MockBrowser::new().with_settle_delay(Duration::from_millis(120));
    with_pages(Arc::new(browser), ShopConfig::default(), |pages| async move {
        let card = pages.products_page().get_product_by_index(0).await?;
        card.add_to_cart().await?;
        assert!(card.is_added_to_cart().await?);
        Ok(())
    })
    .await
    .unwrap();
}
