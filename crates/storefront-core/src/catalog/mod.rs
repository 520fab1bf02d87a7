//! Product catalog: option derivation and product page state.

pub mod options;
mod product;

pub use options::{
    derive_options, derive_selected_options, AttributeRecord, AttributeValue, DerivedOptions,
    OptionEntry, OptionSet, VariantRecord,
};
pub use product::{ProductDetails, ProductItemDetails, ProductStore, SelectedItem};
