//! Inventory page and its product cards.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::locator::Locator;
use crate::money::Price;
use crate::page_object::{Component, Page};
use crate::result::{ShopError, ShopResult};
use crate::session::Document;
use crate::wait::ElementState;

const INVENTORY_ITEM: &str = r#"[data-test="inventory-item"]"#;

/// Orderings offered by the sort dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOption {
    /// Name (A to Z)
    NameAsc,
    /// Name (Z to A)
    NameDesc,
    /// Price (low to high)
    PriceLowHigh,
    /// Price (high to low)
    PriceHighLow,
}

impl SortOption {
    /// Every option, in dropdown order
    pub const ALL: [Self; 4] = [
        Self::NameAsc,
        Self::NameDesc,
        Self::PriceLowHigh,
        Self::PriceHighLow,
    ];

    /// `<option>` value
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::NameAsc => "az",
            Self::NameDesc => "za",
            Self::PriceLowHigh => "lohi",
            Self::PriceHighLow => "hilo",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for SortOption {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.value() == s)
            .ok_or_else(|| ShopError::not_found("Sort option", s))
    }
}

/// One product tile of the inventory
#[derive(Debug, Clone)]
pub struct ProductCard {
    root: Locator,
    document: Document,
}

impl Component for ProductCard {
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

impl ProductCard {
    /// Product name
    #[must_use]
    pub fn name_element(&self) -> Locator {
        self.locator(r#"[data-test="inventory-item-name"]"#)
    }

    /// Displayed price
    #[must_use]
    pub fn price_element(&self) -> Locator {
        self.locator(".inventory_item_price")
    }

    /// Description text
    #[must_use]
    pub fn description_element(&self) -> Locator {
        self.locator(".inventory_item_desc")
    }

    /// Title link
    #[must_use]
    pub fn link_element(&self) -> Locator {
        self.locator(".inventory_item_label a")
    }

    /// Product image
    #[must_use]
    pub fn image_element(&self) -> Locator {
        self.locator("img.inventory_item_img")
    }

    /// "Add to cart" button; present only while the product is not in the cart
    #[must_use]
    pub fn add_to_cart_button(&self) -> Locator {
        self.root.get_by_role("button", "Add to cart")
    }

    /// "Remove" button; present only while the product is in the cart
    #[must_use]
    pub fn remove_button(&self) -> Locator {
        self.root.get_by_role("button", "Remove")
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

    /// `href` of the title link, empty when absent
    pub async fn get_link(&self) -> ShopResult<String> {
        Ok(self
            .link_element()
            .get_attribute("href")
            .await?
            .unwrap_or_default())
    }

    /// Click "Add to cart" and wait for "Remove" to show
    pub async fn add_to_cart(&self) -> ShopResult<()> {
        self.add_to_cart_button().click().await?;
        self.remove_button()
            .wait_for(ElementState::Visible, None)
            .await
    }

    /// Click "Remove" and wait for "Add to cart" to show
    pub async fn remove_from_cart(&self) -> ShopResult<()> {
        self.remove_button().click().await?;
        self.add_to_cart_button()
            .wait_for(ElementState::Visible, None)
            .await
    }

    /// Whether the card shows its "Remove" control
    pub async fn is_added_to_cart(&self) -> ShopResult<bool> {
        self.remove_button().is_visible().await
    }

    /// Open the product's detail page
    pub async fn open_details(&self) -> ShopResult<()> {
        self.name_element().click().await
    }
}

/// The inventory at `/inventory.html`
#[derive(Debug, Clone)]
pub struct ProductsPage {
    document: Document,
}

#[async_trait]
impl Page for ProductsPage {
    fn document(&self) -> &Document {
        &self.document
    }

    fn path(&self) -> Option<&str> {
        Some("/inventory.html")
    }

    fn page_name(&self) -> &str {
        "ProductsPage"
    }
}

impl ProductsPage {
    /// Bind to a document
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }

    /// Cart icon in the header
    #[must_use]
    pub fn cart_button(&self) -> Locator {
        self.locator("#shopping_cart_container")
    }

    /// Sort `<select>`; its visibility marks a signed-in inventory
    #[must_use]
    pub fn sort_dropdown(&self) -> Locator {
        self.locator(r#"[data-test="product-sort-container"]"#)
    }

    /// Item count badge; absent while the cart is empty
    #[must_use]
    pub fn cart_badge(&self) -> Locator {
        self.locator(r#"[data-test="shopping-cart-badge"]"#)
    }

    /// Page heading
    #[must_use]
    pub fn title(&self) -> Locator {
        self.locator(".title")
    }

    /// One card per product currently listed, in display order
    pub async fn get_product_cards(&self) -> ShopResult<Vec<ProductCard>> {
        self.get_list_of_components(INVENTORY_ITEM).await
    }

    /// First card whose name equals `name`, or `None`
    pub async fn find_product_by_name(&self, name: &str) -> ShopResult<Option<ProductCard>> {
        for card in self.get_product_cards().await? {
            if card.get_name().await? == name {
                return Ok(Some(card));
            }
        }
        Ok(None)
    }

    /// Card at `index` (zero-based)
    pub async fn get_product_by_index(&self, index: usize) -> ShopResult<ProductCard> {
        let mut cards = self.get_product_cards().await?;
        let len = cards.len();
        if index >= len {
            return Err(ShopError::OutOfRange { index, len });
        }
        Ok(cards.swap_remove(index))
    }

    /// Choose a sort order by its `<option>` value (`az`, `za`, `lohi`, `hilo`)
    pub async fn sort_products(&self, option: &str) -> ShopResult<()> {
        tracing::info!(option, "sort products");
        self.sort_dropdown().select_option(option).await?;
        Ok(())
    }

    /// Choose a sort order
    pub async fn sort_by(&self, option: SortOption) -> ShopResult<()> {
        self.sort_products(option.value()).await
    }

    /// Open the cart through the header icon
    pub async fn go_to_cart(&self) -> ShopResult<()> {
        self.cart_button().click().await
    }

    /// Number on the cart badge; 0 when there is no badge
    pub async fn get_cart_count(&self) -> ShopResult<u32> {
        let badge = self.cart_badge();
        if badge.count().await? == 0 {
            return Ok(0);
        }
        parse_count(&badge.text().await?)
    }

    /// Add the product named `name`, waiting for its card to confirm
    pub async fn add_product_to_cart(&self, name: &str) -> ShopResult<()> {
        let card = self
            .find_product_by_name(name)
            .await?
            .ok_or_else(|| ShopError::not_found("Product", name))?;
        card.add_to_cart().await
    }
}

/// Parse a counter; empty text counts as zero
pub(crate) fn parse_count(text: &str) -> ShopResult<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse().map_err(|_| ShopError::InvalidNumber {
        text: text.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::mock::MockBrowser;
    use crate::pages::LoginForm;
    use crate::result::ErrorKind;
    use crate::{BrowserLauncher, Session};

    async fn inventory(browser: &MockBrowser) -> (Session, ProductsPage) {
        let session = browser.new_session().await.unwrap();
        let login = LoginForm::new(session.document().clone());
        login.open().await.unwrap();
        login.login(&Credentials::standard_user()).await.unwrap();
        let page = ProductsPage::new(session.document().clone());
        (session, page)
    }

    mod sort_option_tests {
        use super::*;

        #[test]
        fn test_values_round_trip() {
            for option in SortOption::ALL {
                assert_eq!(option.value().parse::<SortOption>().unwrap(), option);
            }
            assert!("newest".parse::<SortOption>().is_err());
        }
    }

    mod count_tests {
        use super::*;

        #[test]
        fn test_parse_count() {
            assert_eq!(parse_count(" 3 ").unwrap(), 3);
            assert_eq!(parse_count("").unwrap(), 0);
            assert_eq!(parse_count("x").unwrap_err().kind(), ErrorKind::InvalidNumber);
        }
    }

    mod card_tests {
        use super::*;

        #[tokio::test]
        async fn test_first_card_details() {
            let (_session, page) = inventory(&MockBrowser::new()).await;
            let card = page.get_product_by_index(0).await.unwrap();
            assert_eq!(card.get_name().await.unwrap(), "Sauce Labs Backpack");
            assert_eq!(card.get_price().await.unwrap(), "$29.99");
            assert_eq!(card.get_price_value().await.unwrap().cents(), 2999);
            assert!(card
                .get_description()
                .await
                .unwrap()
                .starts_with("carry.allTheThings()"));
            assert_eq!(card.get_link().await.unwrap(), "#");
            assert_eq!(
                card.image_element().get_attribute("alt").await.unwrap().as_deref(),
                Some("Sauce Labs Backpack")
            );
        }

        #[tokio::test]
        async fn test_add_then_remove_restores_state() {
            let (_session, page) = inventory(&MockBrowser::new()).await;
            let card = page.get_product_by_index(1).await.unwrap();
            assert!(!card.is_added_to_cart().await.unwrap());

            card.add_to_cart().await.unwrap();
            assert!(card.is_added_to_cart().await.unwrap());
            assert_eq!(page.get_cart_count().await.unwrap(), 1);

            card.remove_from_cart().await.unwrap();
            assert!(!card.is_added_to_cart().await.unwrap());
            assert_eq!(page.get_cart_count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_add_waits_for_delayed_ui() {
            let browser = MockBrowser::new().with_settle_delay(std::time::Duration::from_millis(40));
            let (_session, page) = inventory(&browser).await;
            page.sort_dropdown()
                .wait_for(ElementState::Visible, None)
                .await
                .unwrap();
            page.add_product_to_cart("Sauce Labs Onesie").await.unwrap();
            assert_eq!(page.get_cart_count().await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_open_details() {
            let (session, page) = inventory(&MockBrowser::new()).await;
            let card = page.find_product_by_name("Sauce Labs Bike Light").await.unwrap().unwrap();
            card.open_details().await.unwrap();
            assert_eq!(
                session.document().current_url().await.unwrap(),
                "https://www.saucedemo.com/inventory-item.html?id=0"
            );
        }
    }

    mod page_tests {
        use super::*;

        #[tokio::test]
        async fn test_lookup_misses() {
            let (_session, page) = inventory(&MockBrowser::new()).await;
            assert!(page.find_product_by_name("nonexistent").await.unwrap().is_none());

            let err = page.add_product_to_cart("nonexistent").await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
            assert!(err.to_string().contains("nonexistent"));

            let err = page.get_product_by_index(6).await.unwrap_err();
            assert!(matches!(err, ShopError::OutOfRange { index: 6, len: 6 }));
        }

        #[tokio::test]
        async fn test_sort_by_price() {
            let (_session, page) = inventory(&MockBrowser::new()).await;
            page.sort_by(SortOption::PriceHighLow).await.unwrap();
            let first = page.get_product_by_index(0).await.unwrap();
            assert_eq!(first.get_name().await.unwrap(), "Sauce Labs Fleece Jacket");

            let mut prices = Vec::new();
            for card in page.get_product_cards().await.unwrap() {
                prices.push(card.get_price_value().await.unwrap());
            }
            assert!(prices.windows(2).all(|w| w[0] >= w[1]));
        }

        #[tokio::test]
        async fn test_invalid_sort_option_fails_in_driver() {
            let (_session, page) = inventory(&MockBrowser::new()).await;
            let err = page.sort_products("newest").await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::LocatorResolution);
        }

        #[tokio::test]
        async fn test_go_to_cart() {
            let (session, page) = inventory(&MockBrowser::new()).await;
            assert_eq!(page.title().text().await.unwrap(), "Products");
            page.go_to_cart().await.unwrap();
            assert_eq!(session.document().current_path().await.unwrap(), "/cart.html");
            assert!(!page.is_current().await.unwrap());
        }
    }
}
