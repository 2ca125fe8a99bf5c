//! Shopping cart page and its rows.

use async_trait::async_trait;

use crate::locator::Locator;
use crate::money::{parse_amount, round_to_cents, Price};
use crate::page_object::{Component, Page};
use crate::result::{ShopError, ShopResult};
use crate::session::Document;
use crate::wait::ElementState;

use super::products::parse_count;

/// One row of the cart
#[derive(Debug, Clone)]
pub struct CartItem {
    root: Locator,
    document: Document,
}

impl Component for CartItem {
    fn from_root(root: Locator, document: Document) -> Self {
        Self { root, document }
    }

    fn root(&self) -> &Locator {
        &self.root
    }

    fn document(&self) -> &Document {
        &self.document
    }
}

impl CartItem {
    /// Product name
    #[must_use]
    pub fn name_element(&self) -> Locator {
        self.locator(r#"[data-test="inventory-item-name"]"#)
    }

    /// Displayed price
    #[must_use]
    pub fn price_element(&self) -> Locator {
        self.locator(r#"[data-test="inventory-item-price"]"#)
    }

    /// Description text
    #[must_use]
    pub fn description_element(&self) -> Locator {
        self.locator(r#"[data-test="inventory-item-desc"]"#)
    }

    /// Quantity cell
    #[must_use]
    pub fn quantity_element(&self) -> Locator {
        self.locator(r#"[data-test="item-quantity"]"#)
    }

    /// This row's "Remove" button
    #[must_use]
    pub fn remove_button(&self) -> Locator {
        self.root.get_by_role("button", "Remove")
    }

    /// Title link
    #[must_use]
    pub fn link_element(&self) -> Locator {
        self.locator(".cart_item_label a")
    }

    /// Trimmed product name
    pub async fn get_name(&self) -> ShopResult<String> {
        self.name_element().text().await
    }

    /// Trimmed price text, e.g. `$29.99`
    pub async fn get_price(&self) -> ShopResult<String> {
        self.price_element().text().await
    }

    /// Price as an amount
    pub async fn get_price_value(&self) -> ShopResult<Price> {
        self.get_price().await?.parse()
    }

    /// Trimmed description
    pub async fn get_description(&self) -> ShopResult<String> {
        self.description_element().text().await
    }

    /// Quantity; 0 when the cell is empty
    pub async fn get_quantity(&self) -> ShopResult<u32> {
        parse_count(&self.quantity_element().text().await?)
    }

    /// Click "Remove". The row disappears; nothing is awaited.
    pub async fn remove(&self) -> ShopResult<()> {
        self.remove_button().click().await
    }
}

/// The cart at `/cart.html`
#[derive(Debug, Clone)]
pub struct ShoppingCartPage {
    document: Document,
}

#[async_trait]
impl Page for ShoppingCartPage {
    fn document(&self) -> &Document {
        &self.document
    }

    fn path(&self) -> Option<&str> {
        Some("/cart.html")
    }

    fn page_name(&self) -> &str {
        "ShoppingCartPage"
    }

    /// Navigate to the cart and wait for its heading
    async fn open(&self) -> ShopResult<()> {
        tracing::info!(page = self.page_name(), "open");
        self.document.goto("/cart.html").await?;
        self.title().wait_for(ElementState::Visible, None).await
    }
}

impl ShoppingCartPage {
    /// Bind to a document
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }

    /// Page heading
    #[must_use]
    pub fn title(&self) -> Locator {
        self.locator(".title")
    }

    /// "Checkout" button
    #[must_use]
    pub fn checkout_button(&self) -> Locator {
        self.locator(r#"[data-test="checkout"]"#)
    }

    /// "Continue Shopping" button
    #[must_use]
    pub fn continue_shopping_button(&self) -> Locator {
        self.locator(r#"button[data-test="continue-shopping"]"#)
    }

    /// One row per cart line, in display order
    pub async fn get_cart_items(&self) -> ShopResult<Vec<CartItem>> {
        self.get_list_of_components(r#"[data-test="inventory-item"]"#)
            .await
    }

    /// First row whose name equals `name`, or `None`
    pub async fn find_item_by_name(&self, name: &str) -> ShopResult<Option<CartItem>> {
        for item in self.get_cart_items().await? {
            if item.get_name().await? == name {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Number of rows
    pub async fn get_item_count(&self) -> ShopResult<usize> {
        Ok(self.get_cart_items().await?.len())
    }

    /// Remove the row named `name`
    pub async fn remove_item(&self, name: &str) -> ShopResult<()> {
        let item = self
            .find_item_by_name(name)
            .await?
            .ok_or_else(|| ShopError::not_found("Cart item", name))?;
        item.remove().await
    }

    /// Exact sum of the row prices, each rounded to the cent
    pub async fn get_total(&self) -> ShopResult<Price> {
        let mut prices = Vec::new();
        for item in self.get_cart_items().await? {
            prices.push(item.get_price_value().await?);
        }
        Price::total(prices)
    }

    /// Sum of the displayed row prices, rounded once to two decimals
    pub async fn get_total_price(&self) -> ShopResult<f64> {
        let mut total = 0.0;
        for item in self.get_cart_items().await? {
            total += parse_amount(&item.get_price().await?)?;
        }
        Ok(round_to_cents(total))
    }

    /// Proceed to checkout
    pub async fn checkout(&self) -> ShopResult<()> {
        self.checkout_button().click().await
    }

    /// Return to the inventory
    pub async fn continue_shopping(&self) -> ShopResult<()> {
        self.continue_shopping_button().click().await
    }
}
