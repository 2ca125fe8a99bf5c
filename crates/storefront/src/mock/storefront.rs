//! The demo shop as in-memory state.
//!
//! [`Storefront`] holds what the real site keeps in its React store (route,
//! signed-in user, cart, sort order, form inputs, error banner) and renders
//! the current route to a [`Dom`] with the site's class names and
//! `data-test` attributes.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use super::dom::{Dom, Element};
use crate::money::Price;
use crate::session::url_path;

/// What a click triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Submit the login form
    Login,
    /// Close the error banner
    DismissError,
    /// Add a product to the cart
    AddToCart(u32),
    /// Remove a product from the cart
    RemoveFromCart(u32),
    /// Open a product's detail page
    OpenProduct(u32),
    /// Open the cart
    OpenCart,
    /// Back to the inventory (details and completion pages)
    BackToProducts,
    /// Leave the cart for the inventory
    ContinueShopping,
    /// Start checkout from the cart
    Checkout,
    /// Submit customer information
    ContinueCheckout,
    /// Leave checkout
    CancelCheckout,
    /// Place the order
    Finish,
}

/// A product of the demo inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Item id used in detail URLs
    pub id: u32,
    /// Display name
    pub name: &'static str,
    /// Description text
    pub description: &'static str,
    /// Price in cents
    pub price_cents: i64,
}

impl Product {
    /// Lower-case, dash-separated name used in `data-test` attributes
    #[must_use]
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }

    /// Price
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::from_cents(self.price_cents)
    }
}

/// The six products of the demo shop, in default (name ascending) order
pub const INVENTORY: [Product; 6] = [
    Product {
        id: 4,
        name: "Sauce Labs Backpack",
        description: "carry.allTheThings() with the sleek, streamlined Sly Pack that melds uncompromising style with unequaled laptop and tablet protection.",
        price_cents: 2999,
    },
    Product {
        id: 0,
        name: "Sauce Labs Bike Light",
        description: "A red light isn't the desired state in testing but it sure helps when riding your bike at night. Water-resistant with 3 lighting modes, 1 AAA battery included.",
        price_cents: 999,
    },
    Product {
        id: 1,
        name: "Sauce Labs Bolt T-Shirt",
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt. From American Apparel, 100% ringspun combed cotton, heather gray with red bolt.",
        price_cents: 1599,
    },
    Product {
        id: 5,
        name: "Sauce Labs Fleece Jacket",
        description: "It's not every day that you come across a midweight quarter-zip fleece jacket capable of handling everything from a relaxing day outdoors to a busy day at the office.",
        price_cents: 4999,
    },
    Product {
        id: 2,
        name: "Sauce Labs Onesie",
        description: "Rib snap infant onesie for the junior automation engineer in development. Reinforced 3-snap bottom closure, two-needle hemmed sleeved and bottom won't unravel.",
        price_cents: 799,
    },
    Product {
        id: 3,
        name: "Test.allTheThings() T-Shirt (Red)",
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests. Super-soft and comfy ringspun combed cotton.",
        price_cents: 1599,
    },
];

/// Accepted password for every account
pub const PASSWORD: &str = "secret_sauce";

/// Accounts that can sign in
pub const USERS: [&str; 5] = [
    "standard_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

/// Account that exists but is refused
pub const LOCKED_OUT_USER: &str = "locked_out_user";

/// Order confirmation header
pub const COMPLETE_HEADER: &str = "Thank you for your order!";

/// Order confirmation text
pub const COMPLETE_TEXT: &str =
    "Your order has been dispatched, and will arrive just as fast as the pony can get there!";

const SORT_OPTIONS: [(&str, &str); 4] = [
    ("az", "Name (A to Z)"),
    ("za", "Name (Z to A)"),
    ("lohi", "Price (low to high)"),
    ("hilo", "Price (high to low)"),
];

fn product(id: u32) -> Option<&'static Product> {
    INVENTORY.iter().find(|p| p.id == id)
}

/// Page currently shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Nothing loaded yet
    Blank,
    /// `/`
    Login,
    /// `/inventory.html`
    Inventory,
    /// `/inventory-item.html?id=N`
    Details(Option<u32>),
    /// `/cart.html`
    Cart,
    /// `/checkout-step-one.html`
    CheckoutInfo,
    /// `/checkout-step-two.html`
    CheckoutOverview,
    /// `/checkout-complete.html`
    CheckoutComplete,
    /// Anything else
    Missing(String),
}

impl Route {
    fn from_url(path_and_query: &str) -> Self {
        let path = url_path(path_and_query);
        match path {
            "" | "/" | "/index.html" => Self::Login,
            "/inventory.html" => Self::Inventory,
            "/inventory-item.html" => Self::Details(query_param(path_and_query, "id")),
            "/cart.html" => Self::Cart,
            "/checkout-step-one.html" => Self::CheckoutInfo,
            "/checkout-step-two.html" => Self::CheckoutOverview,
            "/checkout-complete.html" => Self::CheckoutComplete,
            other => Self::Missing(other.to_string()),
        }
    }

    fn path(&self) -> String {
        match self {
            Self::Blank => String::new(),
            Self::Login => "/".to_string(),
            Self::Inventory => "/inventory.html".to_string(),
            Self::Details(Some(id)) => format!("/inventory-item.html?id={id}"),
            Self::Details(None) => "/inventory-item.html".to_string(),
            Self::Cart => "/cart.html".to_string(),
            Self::CheckoutInfo => "/checkout-step-one.html".to_string(),
            Self::CheckoutOverview => "/checkout-step-two.html".to_string(),
            Self::CheckoutComplete => "/checkout-complete.html".to_string(),
            Self::Missing(path) => path.clone(),
        }
    }

    const fn requires_login(&self) -> bool {
        !matches!(self, Self::Blank | Self::Login | Self::Missing(_))
    }
}

fn query_param(url: &str, name: &str) -> Option<u32> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.parse().ok())
}

/// State of one session's storefront
#[derive(Debug, Clone)]
pub struct Storefront {
    base_url: String,
    route: Route,
    user: Option<String>,
    cart: Vec<u32>,
    sort: String,
    fields: HashMap<String, String>,
    error: Option<String>,
    settle_delay: Duration,
    pending: VecDeque<(Instant, Action)>,
}

impl Storefront {
    /// Blank page of a shop served at `base_url`
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            route: Route::Blank,
            user: None,
            cart: Vec::new(),
            sort: "az".to_string(),
            fields: HashMap::new(),
            error: None,
            settle_delay: Duration::ZERO,
            pending: VecDeque::new(),
        }
    }

    /// Make click effects visible only after `delay`
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Current route
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    /// Signed-in user
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Product ids in the cart, in the order they were added
    #[must_use]
    pub fn cart(&self) -> &[u32] {
        &self.cart
    }

    /// Current document URL
    #[must_use]
    pub fn url(&self) -> String {
        match self.route {
            Route::Blank => "about:blank".to_string(),
            ref route => format!("{}{}", self.base_url, route.path()),
        }
    }

    /// Load `url`. Protected pages redirect to the login page when signed out.
    pub fn navigate(&mut self, url: &str) -> Result<(), String> {
        let rest = url
            .strip_prefix(&self.base_url)
            .filter(|rest| rest.is_empty() || rest.starts_with(&['/', '?', '#'][..]))
            .ok_or_else(|| format!("net::ERR_NAME_NOT_RESOLVED at {url}"))?;
        let route = Route::from_url(rest);
        self.pending.clear();
        self.fields.clear();
        self.error = None;
        if route.requires_login() && self.user.is_none() {
            self.error = Some(format!(
                "Epic sadface: You can only access '{}' when you are logged in.",
                url_path(rest)
            ));
            self.route = Route::Login;
        } else {
            self.route = route;
        }
        Ok(())
    }

    /// Apply a click now, or after the settle delay
    pub fn click(&mut self, action: Action, now: Instant) {
        if self.settle_delay.is_zero() {
            self.apply(action);
        } else {
            self.pending.push_back((now + self.settle_delay, action));
        }
    }

    /// Apply every delayed click that is due
    pub fn settle(&mut self, now: Instant) {
        while self.pending.front().is_some_and(|(due, _)| *due <= now) {
            if let Some((_, action)) = self.pending.pop_front() {
                self.apply(action);
            }
        }
    }

    /// Type into the input identified by `key` (its `data-test`)
    pub fn fill(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }

    /// Choose an option of the select identified by `key`
    pub fn select(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "product-sort-container" if SORT_OPTIONS.iter().any(|(v, _)| *v == value) => {
                self.sort = value.to_string();
                Ok(())
            }
            _ => Err(format!("no option {value:?} in {key:?}")),
        }
    }

    fn field(&self, key: &str) -> &str {
        self.fields.get(key).map_or("", String::as_str)
    }

    fn go(&mut self, route: Route) {
        self.route = route;
        self.fields.clear();
        self.error = None;
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Login => self.login(),
            Action::DismissError => self.error = None,
            Action::AddToCart(id) => {
                if !self.cart.contains(&id) {
                    self.cart.push(id);
                }
            }
            Action::RemoveFromCart(id) => self.cart.retain(|&c| c != id),
            Action::OpenProduct(id) => self.go(Route::Details(Some(id))),
            Action::OpenCart => self.go(Route::Cart),
            Action::BackToProducts | Action::ContinueShopping => self.go(Route::Inventory),
            Action::Checkout => self.go(Route::CheckoutInfo),
            Action::ContinueCheckout => self.continue_checkout(),
            Action::CancelCheckout => match self.route {
                Route::CheckoutInfo => self.go(Route::Cart),
                _ => self.go(Route::Inventory),
            },
            Action::Finish => {
                self.cart.clear();
                self.go(Route::CheckoutComplete);
            }
        }
    }

    fn login(&mut self) {
        let username = self.field("username").to_string();
        let password = self.field("password").to_string();
        let error = if username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if password == PASSWORD && username == LOCKED_OUT_USER {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else if password != PASSWORD || !USERS.contains(&username.as_str()) {
            Some("Epic sadface: Username and password do not match any user in this service")
        } else {
            None
        };
        match error {
            Some(message) => self.error = Some(message.to_string()),
            None => {
                tracing::debug!(%username, "mock storefront login");
                self.user = Some(username);
                self.go(Route::Inventory);
            }
        }
    }

    fn continue_checkout(&mut self) {
        let required = [
            ("firstName", "Error: First Name is required"),
            ("lastName", "Error: Last Name is required"),
            ("postalCode", "Error: Postal Code is required"),
        ];
        match required.iter().find(|(key, _)| self.field(key).is_empty()) {
            Some((_, message)) => self.error = Some((*message).to_string()),
            None => self.go(Route::CheckoutOverview),
        }
    }

    fn sorted_inventory(&self) -> Vec<&'static Product> {
        let mut products: Vec<&Product> = INVENTORY.iter().collect();
        match self.sort.as_str() {
            "za" => products.sort_by(|a, b| b.name.cmp(a.name)),
            "lohi" => products.sort_by_key(|p| p.price_cents),
            "hilo" => products.sort_by(|a, b| b.price_cents.cmp(&a.price_cents)),
            _ => products.sort_by(|a, b| a.name.cmp(b.name)),
        }
        products
    }

    /// Render the current route
    #[must_use]
    pub fn render(&self) -> Dom {
        let page = match &self.route {
            Route::Blank => Element::new("div"),
            Route::Login => self.login_page(),
            Route::Missing(path) => Element::new("div").class("not_found").child(
                Element::new("h1").text(format!("404 Not Found: {path}")),
            ),
            route => self.app_page(route),
        };
        Dom::new(Element::new("body").child(Element::new("div").id("root").child(page)))
    }

    fn input(&self, key: &str, id: &str, kind: &str, placeholder: &str) -> Element {
        let errored = self.error.is_some();
        Element::new("input")
            .class(if errored { "input_error form_input error" } else { "input_error form_input" })
            .attr("placeholder", placeholder)
            .attr("type", kind)
            .data_test(key)
            .id(id)
            .attr("name", id)
            .attr("value", self.field(key))
    }

    fn error_banner(&self) -> Element {
        let container = Element::new("div").class(if self.error.is_some() {
            "error-message-container error"
        } else {
            "error-message-container"
        });
        match &self.error {
            Some(message) => container.child(
                Element::new("h3").data_test("error").text(message.clone()).child(
                    Element::new("button")
                        .class("error-button")
                        .data_test("error-button")
                        .on_click(Action::DismissError),
                ),
            ),
            None => container,
        }
    }

    fn login_page(&self) -> Element {
        Element::new("div")
            .class("login_container")
            .child(Element::new("div").class("login_logo").text("Swag Labs"))
            .child(
                Element::new("div").class("login_wrapper").child(
                    Element::new("form")
                        .child(self.input("username", "user-name", "text", "Username"))
                        .child(self.input("password", "password", "password", "Password"))
                        .child(self.error_banner())
                        .child(
                            Element::new("input")
                                .attr("type", "submit")
                                .class("submit-button btn_action")
                                .data_test("login-button")
                                .id("login-button")
                                .attr("name", "login-button")
                                .attr("value", "Login")
                                .on_click(Action::Login),
                        ),
                ),
            )
            .child(
                Element::new("div")
                    .class("login_credentials")
                    .data_test("login-credentials")
                    .text(format!("Accepted usernames are:{}", USERS.join(" "))),
            )
    }

    fn app_page(&self, route: &Route) -> Element {
        let title = match route {
            Route::Inventory => Some("Products"),
            Route::Cart => Some("Your Cart"),
            Route::CheckoutInfo => Some("Checkout: Your Information"),
            Route::CheckoutOverview => Some("Checkout: Overview"),
            Route::CheckoutComplete => Some("Checkout: Complete!"),
            _ => None,
        };
        let mut secondary = Element::new("div")
            .class("header_secondary_container")
            .data_test("secondary-header");
        if let Some(title) = title {
            secondary = secondary.child(Element::new("span").class("title").data_test("title").text(title));
        }
        if *route == Route::Inventory {
            secondary = secondary.child(self.sort_control());
        }
        let content = match route {
            Route::Inventory => self.inventory(),
            Route::Details(id) => self.details(*id),
            Route::Cart => self.cart_page(),
            Route::CheckoutInfo => self.checkout_info(),
            Route::CheckoutOverview => self.checkout_overview(),
            _ => Self::checkout_complete(),
        };
        Element::new("div")
            .id("page_wrapper")
            .class("page_wrapper")
            .child(
                Element::new("div")
                    .id("contents_wrapper")
                    .child(self.primary_header())
                    .child(secondary)
                    .child(content),
            )
            .child(
                Element::new("footer").class("footer").data_test("footer").child(
                    Element::new("div")
                        .class("footer_copy")
                        .data_test("footer-copy")
                        .text("© 2025 Sauce Labs. All Rights Reserved. Terms of Service | Privacy Policy"),
                ),
            )
    }

    fn primary_header(&self) -> Element {
        let mut link = Element::new("a")
            .class("shopping_cart_link")
            .data_test("shopping-cart-link")
            .on_click(Action::OpenCart);
        if !self.cart.is_empty() {
            link = link.child(
                Element::new("span")
                    .class("shopping_cart_badge")
                    .data_test("shopping-cart-badge")
                    .text(self.cart.len().to_string()),
            );
        }
        Element::new("div")
            .class("primary_header")
            .data_test("primary-header")
            .child(Element::new("div").class("app_logo").text("Swag Labs"))
            .child(
                Element::new("div")
                    .id("shopping_cart_container")
                    .class("shopping_cart_container")
                    .child(link),
            )
    }

    fn sort_control(&self) -> Element {
        let active = SORT_OPTIONS
            .iter()
            .find(|(value, _)| *value == self.sort)
            .map_or("", |(_, label)| label);
        Element::new("div").class("right_component").child(
            Element::new("span")
                .class("select_container")
                .child(
                    Element::new("span")
                        .class("active_option")
                        .data_test("active-option")
                        .text(active),
                )
                .child(
                    Element::new("select")
                        .class("product_sort_container")
                        .data_test("product-sort-container")
                        .attr("value", self.sort.clone())
                        .children(SORT_OPTIONS.iter().map(|(value, label)| {
                            Element::new("option").attr("value", *value).text(*label)
                        })),
                ),
        )
    }

    fn cart_button(&self, product: &Product, test_id: Option<&str>) -> Element {
        let slug = product.slug();
        let (verb, label, style, action) = if self.cart.contains(&product.id) {
            ("remove", "Remove", "btn_secondary", Action::RemoveFromCart(product.id))
        } else {
            ("add-to-cart", "Add to cart", "btn_primary", Action::AddToCart(product.id))
        };
        let test_id = test_id.map_or_else(|| format!("{verb}-{slug}"), |_| verb.to_string());
        Element::new("button")
            .class(&format!("btn {style} btn_small btn_inventory"))
            .data_test(test_id.clone())
            .id(&test_id)
            .attr("name", test_id.clone())
            .text(label)
            .on_click(action)
    }

    fn title_link(product: &Product, class: &str) -> Element {
        Element::new("a")
            .attr("href", "#")
            .id(&format!("item_{}_title_link", product.id))
            .data_test(format!("item-{}-title-link", product.id))
            .on_click(Action::OpenProduct(product.id))
            .child(
                Element::new("div")
                    .class(class)
                    .data_test("inventory-item-name")
                    .text(product.name),
            )
    }

    fn price(product: &Product, class: &str) -> Element {
        Element::new("div")
            .class(class)
            .data_test("inventory-item-price")
            .text(product.price().to_string())
    }

    fn inventory(&self) -> Element {
        let items = self.sorted_inventory().into_iter().map(|product| {
            let slug = product.slug();
            Element::new("div")
                .class("inventory_item")
                .data_test("inventory-item")
                .child(
                    Element::new("div").class("inventory_item_img").child(
                        Element::new("a")
                            .attr("href", "#")
                            .id(&format!("item_{}_img_link", product.id))
                            .data_test(format!("item-{}-img-link", product.id))
                            .on_click(Action::OpenProduct(product.id))
                            .child(
                                Element::new("img")
                                    .attr("alt", product.name)
                                    .class("inventory_item_img")
                                    .attr("src", format!("/static/media/{slug}.jpg"))
                                    .data_test(format!("inventory-item-{slug}-img")),
                            ),
                    ),
                )
                .child(
                    Element::new("div")
                        .class("inventory_item_description")
                        .data_test("inventory-item-description")
                        .child(
                            Element::new("div")
                                .class("inventory_item_label")
                                .child(Self::title_link(product, "inventory_item_name"))
                                .child(
                                    Element::new("div")
                                        .class("inventory_item_desc")
                                        .data_test("inventory-item-desc")
                                        .text(product.description),
                                ),
                        )
                        .child(
                            Element::new("div")
                                .class("pricebar")
                                .child(Self::price(product, "inventory_item_price"))
                                .child(self.cart_button(product, None)),
                        ),
                )
        });
        Element::new("div")
            .class("inventory_container")
            .data_test("inventory-container")
            .child(
                Element::new("div")
                    .class("inventory_list")
                    .data_test("inventory-list")
                    .children(items),
            )
    }

    fn details(&self, id: Option<u32>) -> Element {
        let back = Element::new("button")
            .class("btn btn_secondary back btn_large inventory_details_back_button")
            .id("back-to-products")
            .data_test("back-to-products")
            .text("Back to products")
            .on_click(Action::BackToProducts);
        let body = match id.and_then(product) {
            Some(product) => Element::new("div")
                .class("inventory_details_desc_container")
                .child(
                    Element::new("div")
                        .class("inventory_details_name large_size")
                        .data_test("inventory-item-name")
                        .text(product.name),
                )
                .child(
                    Element::new("div")
                        .class("inventory_details_desc large_size")
                        .data_test("inventory-item-desc")
                        .text(product.description),
                )
                .child(Self::price(product, "inventory_details_price"))
                .child(self.cart_button(product, Some("details"))),
            None => Element::new("div")
                .class("inventory_details_desc_container")
                .child(
                    Element::new("div")
                        .class("inventory_details_name large_size")
                        .data_test("inventory-item-name")
                        .text("ITEM NOT FOUND"),
                ),
        };
        Element::new("div")
            .class("inventory_details")
            .data_test("inventory-container")
            .child(back)
            .child(Element::new("div").class("inventory_details_container").child(body))
    }

    fn cart_rows(&self, removable: bool) -> Element {
        let rows = self.cart.iter().filter_map(|&id| product(id)).map(|product| {
            let mut pricebar = Element::new("div")
                .class("item_pricebar")
                .data_test("item-pricebar")
                .child(Self::price(product, "inventory_item_price"));
            if removable {
                let test_id = format!("remove-{}", product.slug());
                pricebar = pricebar.child(
                    Element::new("button")
                        .class("btn btn_secondary btn_small cart_button")
                        .data_test(test_id.clone())
                        .id(&test_id)
                        .attr("name", test_id)
                        .text("Remove")
                        .on_click(Action::RemoveFromCart(product.id)),
                );
            }
            Element::new("div")
                .class("cart_item")
                .data_test("inventory-item")
                .child(
                    Element::new("div")
                        .class("cart_quantity")
                        .data_test("item-quantity")
                        .text("1"),
                )
                .child(
                    Element::new("div")
                        .class("cart_item_label")
                        .child(Self::title_link(product, "inventory_item_name"))
                        .child(
                            Element::new("div")
                                .class("inventory_item_desc")
                                .data_test("inventory-item-desc")
                                .text(product.description),
                        )
                        .child(pricebar),
                )
        });
        Element::new("div")
            .class("cart_list")
            .data_test("cart-list")
            .child(
                Element::new("div")
                    .class("cart_quantity_label")
                    .data_test("cart-quantity-label")
                    .text("QTY"),
            )
            .child(
                Element::new("div")
                    .class("cart_desc_label")
                    .data_test("cart-desc-label")
                    .text("Description"),
            )
            .children(rows)
    }

    fn cart_page(&self) -> Element {
        Element::new("div")
            .id("cart_contents_container")
            .class("cart_contents_container")
            .data_test("cart-contents-container")
            .child(self.cart_rows(true))
            .child(
                Element::new("div")
                    .class("cart_footer")
                    .child(
                        Element::new("button")
                            .class("btn btn_secondary back btn_medium")
                            .id("continue-shopping")
                            .data_test("continue-shopping")
                            .attr("name", "continue-shopping")
                            .text("Continue Shopping")
                            .on_click(Action::ContinueShopping),
                    )
                    .child(
                        Element::new("button")
                            .class("btn btn_action btn_medium checkout_button")
                            .id("checkout")
                            .data_test("checkout")
                            .attr("name", "checkout")
                            .text("Checkout")
                            .on_click(Action::Checkout),
                    ),
            )
    }

    fn cancel_button() -> Element {
        Element::new("button")
            .class("btn btn_secondary back btn_medium cart_cancel_link")
            .id("cancel")
            .data_test("cancel")
            .attr("name", "cancel")
            .text("Cancel")
            .on_click(Action::CancelCheckout)
    }

    fn checkout_info(&self) -> Element {
        Element::new("div")
            .id("checkout_info_container")
            .class("checkout_info_container")
            .data_test("checkout-info-container")
            .child(
                Element::new("form")
                    .child(
                        Element::new("div")
                            .class("checkout_info")
                            .data_test("checkout-info")
                            .child(self.input("firstName", "first-name", "text", "First Name"))
                            .child(self.input("lastName", "last-name", "text", "Last Name"))
                            .child(self.input(
                                "postalCode",
                                "postal-code",
                                "text",
                                "Zip/Postal Code",
                            ))
                            .child(self.error_banner()),
                    )
                    .child(
                        Element::new("div")
                            .class("checkout_buttons")
                            .child(Self::cancel_button())
                            .child(
                                Element::new("input")
                                    .attr("type", "submit")
                                    .class("submit-button btn btn_primary cart_button btn_action")
                                    .data_test("continue")
                                    .id("continue")
                                    .attr("name", "continue")
                                    .attr("value", "Continue")
                                    .on_click(Action::ContinueCheckout),
                            ),
                    ),
            )
    }

    fn checkout_overview(&self) -> Element {
        let subtotal = Price::from_cents(
            self.cart
                .iter()
                .filter_map(|&id| product(id))
                .map(|item| item.price().cents())
                .sum(),
        );
        // 8% tax, rounded to the cent
        let tax = Price::from_cents((subtotal.cents() * 8 + 50) / 100);
        let label = |class: &str, test_id: &str, text: String| {
            Element::new("div").class(class).data_test(test_id).text(text)
        };
        Element::new("div")
            .id("checkout_summary_container")
            .class("checkout_summary_container")
            .data_test("checkout-summary-container")
            .child(self.cart_rows(false))
            .child(
                Element::new("div")
                    .class("summary_info")
                    .child(label("summary_info_label", "payment-info-label", "Payment Information:".into()))
                    .child(label("summary_value_label", "payment-info-value", "SauceCard #31337".into()))
                    .child(label("summary_info_label", "shipping-info-label", "Shipping Information:".into()))
                    .child(label(
                        "summary_value_label",
                        "shipping-info-value",
                        "Free Pony Express Delivery!".into(),
                    ))
                    .child(label("summary_info_label", "total-info-label", "Price Total".into()))
                    .child(label("summary_subtotal_label", "subtotal-label", format!("Item total: {subtotal}")))
                    .child(label("summary_tax_label", "tax-label", format!("Tax: {tax}")))
                    .child(label(
                        "summary_total_label",
                        "total-label",
                        format!("Total: {}", Price::from_cents(subtotal.cents() + tax.cents())),
                    ))
                    .child(
                        Element::new("div")
                            .class("cart_footer")
                            .child(Self::cancel_button())
                            .child(
                                Element::new("button")
                                    .class("btn btn_action btn_medium cart_button")
                                    .id("finish")
                                    .data_test("finish")
                                    .attr("name", "finish")
                                    .text("Finish")
                                    .on_click(Action::Finish),
                            ),
                    ),
            )
    }

    fn checkout_complete() -> Element {
        Element::new("div")
            .id("checkout_complete_container")
            .class("checkout_complete_container")
            .data_test("checkout-complete-container")
            .child(
                Element::new("img")
                    .class("pony_express")
                    .data_test("pony-express")
                    .attr("alt", "Pony Express")
                    .attr("src", "/static/media/pony-express.png"),
            )
            .child(
                Element::new("h2")
                    .class("complete-header")
                    .data_test("complete-header")
                    .text(COMPLETE_HEADER),
            )
            .child(
                Element::new("div")
                    .class("complete-text")
                    .data_test("complete-text")
                    .text(COMPLETE_TEXT),
            )
            .child(
                Element::new("button")
                    .class("btn btn_primary btn_small")
                    .id("back-to-products")
                    .data_test("back-to-products")
                    .attr("name", "back-to-products")
                    .text("Back Home")
                    .on_click(Action::BackToProducts),
            )
    }
}
