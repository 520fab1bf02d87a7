//! Checkout: cart lines, server totals, shipping and payment details.

pub mod api;
mod details;
mod state;

pub use api::{Choice, PaymentMethod, ReconciledItem, ShippingAddress};
pub use details::{PaymentDetails, PaymentField, ShippingDetails, ShippingField};
pub use state::{CartApiState, Checkout, CheckoutTotals, RequestKind, ShippingApiState};
