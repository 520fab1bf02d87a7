//! Shopping cart module.

mod cart;
mod line_item;

pub use cart::Cart;
pub use line_item::{LineItem, DEFAULT_CURRENCY_SYMBOL};
