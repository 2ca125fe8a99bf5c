//! All page objects of the shop over one document.

use crate::pages::{CheckoutForm, LoginForm, ProductsPage, ShoppingCartPage};
use crate::session::Document;

/// Every page of the shop, built once over the same document
#[derive(Debug, Clone)]
pub struct Pages {
    document: Document,
    login_page: LoginForm,
    products_page: ProductsPage,
    cart_page: ShoppingCartPage,
    checkout_form: CheckoutForm,
}

impl Pages {
    /// Build every page over `document`
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            login_page: LoginForm::new(document.clone()),
            products_page: ProductsPage::new(document.clone()),
            cart_page: ShoppingCartPage::new(document.clone()),
            checkout_form: CheckoutForm::new(document.clone()),
            document,
        }
    }

    /// The shared document
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Sign-in page
    #[must_use]
    pub const fn login_page(&self) -> &LoginForm {
        &self.login_page
    }

    /// Inventory page
    #[must_use]
    pub const fn products_page(&self) -> &ProductsPage {
        &self.products_page
    }

    /// Cart page
    #[must_use]
    pub const fn cart_page(&self) -> &ShoppingCartPage {
        &self.cart_page
    }

    /// Checkout steps
    #[must_use]
    pub const fn checkout_form(&self) -> &CheckoutForm {
        &self.checkout_form
    }
}
