//! Concrete page objects for the demo shop.
//!
//! Selectors are literals here; nothing else in the crate knows about the
//! shop's markup.

mod cart;
mod checkout;
mod login;
mod products;

pub use cart::{CartItem, ShoppingCartPage};
pub use checkout::CheckoutForm;
pub use login::LoginForm;
pub use products::{ProductCard, ProductsPage, SortOption};
