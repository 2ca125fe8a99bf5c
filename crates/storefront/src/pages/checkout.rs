//! Checkout flow: customer information, overview and completion.
//!
//! The three steps live on different URLs but share one page object; it has
//! no canonical path of its own.

use async_trait::async_trait;

use crate::locator::Locator;
use crate::page_object::Page;
use crate::result::ShopResult;
use crate::session::Document;
use crate::wait::ElementState;

/// Checkout steps one and two plus the confirmation screen
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    document: Document,
}

#[async_trait]
impl Page for CheckoutForm {
    fn document(&self) -> &Document {
        &self.document
    }

    fn page_name(&self) -> &str {
        "CheckoutForm"
    }
}

impl CheckoutForm {
    /// Bind to a document
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }

    /// First name field
    #[must_use]
    pub fn first_name_input(&self) -> Locator {
        self.locator(r#"//input[@data-test="firstName"]"#)
    }

    /// Last name field
    #[must_use]
    pub fn last_name_input(&self) -> Locator {
        self.locator(r#"//input[@data-test="lastName"]"#)
    }

    /// Zip / postal code field
    #[must_use]
    pub fn zip_code_input(&self) -> Locator {
        self.locator(r#"//input[@data-test="postalCode"]"#)
    }

    /// "Cancel" on either step
    #[must_use]
    pub fn cancel_button(&self) -> Locator {
        self.locator(r#"//button[@data-test="cancel"]"#)
    }

    /// "Continue" on step one
    #[must_use]
    pub fn continue_button(&self) -> Locator {
        self.locator(r#"//input[@data-test="continue"]"#)
    }

    /// "Finish" on the overview
    #[must_use]
    pub fn finish_button(&self) -> Locator {
        self.locator(r#"//button[@data-test="finish"]"#)
    }

    /// Confirmation image
    #[must_use]
    pub fn pony_express_image(&self) -> Locator {
        self.locator(r#"//img[@data-test="pony-express"]"#)
    }

    /// Confirmation header
    #[must_use]
    pub fn complete_header(&self) -> Locator {
        self.locator(r#"//h2[@data-test="complete-header"]"#)
    }

    /// Confirmation body text
    #[must_use]
    pub fn complete_text(&self) -> Locator {
        self.locator(r#"//div[@data-test="complete-text"]"#)
    }

    /// "Back Home" on the confirmation screen
    #[must_use]
    pub fn back_to_products_button(&self) -> Locator {
        self.locator(r#"//button[@data-test="back-to-products"]"#)
    }

    /// Validation banner on step one
    #[must_use]
    pub fn error_message(&self) -> Locator {
        self.locator(r#"[data-test="error"]"#)
    }

    /// Navigate to `url`, absolute or relative to the site
    pub async fn goto(&self, url: &str) -> ShopResult<()> {
        self.document.goto(url).await
    }

    /// Type first name, last name and zip, in that order
    pub async fn fill_customer_info(
        &self,
        first_name: &str,
        last_name: &str,
        zip_code: &str,
    ) -> ShopResult<()> {
        tracing::debug!(first_name, last_name, zip_code, "customer info");
        self.first_name_input().fill(first_name).await?;
        self.last_name_input().fill(last_name).await?;
        self.zip_code_input().fill(zip_code).await
    }

    /// Submit step one
    pub async fn continue_checkout(&self) -> ShopResult<()> {
        self.continue_button().click().await
    }

    /// Place the order. Succeeds once the confirmation header is visible.
    pub async fn finish_order(&self) -> ShopResult<()> {
        tracing::info!("finish order");
        self.finish_button().click().await?;
        self.complete_header()
            .wait_for(ElementState::Visible, None)
            .await
    }

    /// Leave the current step
    pub async fn cancel_checkout(&self) -> ShopResult<()> {
        self.cancel_button().click().await
    }

    /// "Back Home" from the confirmation screen
    pub async fn return_to_products(&self) -> ShopResult<()> {
        self.back_to_products_button().click().await
    }

    /// Banner text, or `None` while no error is shown
    pub async fn get_error_message(&self) -> ShopResult<Option<String>> {
        let banner = self.error_message();
        if banner.count().await? == 0 {
            return Ok(None);
        }
        Ok(Some(banner.text().await?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::mock::{MockBrowser, COMPLETE_HEADER, COMPLETE_TEXT};
    use crate::pages::{LoginForm, ProductsPage, ShoppingCartPage};
    use crate::{BrowserLauncher, Session};

    async fn at_step_one(browser: &MockBrowser) -> (Session, CheckoutForm) {
        let session = browser.new_session().await.unwrap();
        let doc = session.document().clone();
        let login = LoginForm::new(doc.clone());
        login.open().await.unwrap();
        login.login(&Credentials::standard_user()).await.unwrap();
        ProductsPage::new(doc.clone())
            .add_product_to_cart("Sauce Labs Backpack")
            .await
            .unwrap();
        let cart = ShoppingCartPage::new(doc.clone());
        cart.open().await.unwrap();
        cart.checkout().await.unwrap();
        (session, CheckoutForm::new(doc))
    }

    mod flow_tests {
        use super::*;

        #[tokio::test]
        async fn test_complete_order() {
            let browser = MockBrowser::new();
            let (session, form) = at_step_one(&browser).await;
            form.fill_customer_info("John", "Doe", "12345").await.unwrap();
            form.continue_checkout().await.unwrap();
            assert_eq!(
                session.document().current_path().await.unwrap(),
                "/checkout-step-two.html"
            );

            form.finish_order().await.unwrap();
            assert_eq!(form.complete_header().text().await.unwrap(), COMPLETE_HEADER);
            assert_eq!(form.complete_text().text().await.unwrap(), COMPLETE_TEXT);
            assert!(form.pony_express_image().is_visible().await.unwrap());

            form.return_to_products().await.unwrap();
            assert_eq!(
                session.document().current_path().await.unwrap(),
                "/inventory.html"
            );
        }

        #[tokio::test]
        async fn test_finish_waits_for_delayed_confirmation() {
            let browser =
                MockBrowser::new().with_settle_delay(std::time::Duration::from_millis(80));
            let (_session, form) = at_step_one(&browser).await;
            form.fill_customer_info("John", "Doe", "12345").await.unwrap();
            form.continue_checkout().await.unwrap();
            form.finish_order().await.unwrap();
            assert!(form.complete_header().is_visible().await.unwrap());
        }

        #[tokio::test]
        async fn test_cancel_returns_to_cart() {
            let browser = MockBrowser::new();
            let (session, form) = at_step_one(&browser).await;
            form.cancel_checkout().await.unwrap();
            assert_eq!(session.document().current_path().await.unwrap(), "/cart.html");
        }

        #[tokio::test]
        async fn test_goto_relative_path() {
            let browser = MockBrowser::new();
            let (session, form) = at_step_one(&browser).await;
            form.goto("/checkout-step-two.html").await.unwrap();
            assert_eq!(
                session.document().current_url().await.unwrap(),
                "https://www.saucedemo.com/checkout-step-two.html"
            );
            assert_eq!(form.finish_button().count().await.unwrap(), 1);
        }
    }

    mod validation_tests {
        use super::*;

        #[tokio::test]
        async fn test_missing_postal_code() {
            let browser = MockBrowser::new();
            let (session, form) = at_step_one(&browser).await;
            assert_eq!(form.get_error_message().await.unwrap(), None);

            form.fill_customer_info("John", "Doe", "").await.unwrap();
            form.continue_checkout().await.unwrap();
            assert_eq!(
                form.get_error_message().await.unwrap().as_deref(),
                Some("Error: Postal Code is required")
            );
            assert_eq!(
                session.document().current_path().await.unwrap(),
                "/checkout-step-one.html"
            );
        }
    }
}
