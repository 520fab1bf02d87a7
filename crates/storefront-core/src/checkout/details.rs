//! Customer shipping and payment details.
//!
//! Both are filled in one form field at a time, so each has a field enum that
//! parses the form's camelCase key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::checkout::api::ShippingAddress;
use crate::error::CommerceError;

macro_rules! detail_fields {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn key(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }

        impl FromStr for $name {
            type Err = CommerceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok($name::$variant),)+
                    _ => Err(CommerceError::UnknownField(s.to_string())),
                }
            }
        }
    };
}

detail_fields! {
    /// A shipping form field.
    ShippingField {
        Country => "country",
        Region => "region",
        City => "city",
        PostalCode => "postalCode",
        ShippingMethod => "shippingMethod",
        FirstName => "firstName",
        LastName => "lastName",
        Email => "email",
        PhoneNumber => "phoneNumber",
        Address1 => "address1",
        Address2 => "address2",
    }
}

detail_fields! {
    /// A payment form field.
    PaymentField {
        PaymentMethod => "paymentMethod",
        CardNumber => "cardNumber",
        CardHolder => "cardHolder",
        CardExpiry => "cardExpiry",
        CardCvc => "cardCvc",
    }
}

/// Shipping details as entered by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingDetails {
    /// Country ISO code.
    pub country: String,
    pub region: String,
    pub city: String,
    pub postal_code: String,
    /// Chosen shipping method value.
    pub shipping_method: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address1: String,
    pub address2: String,
}

impl ShippingDetails {
    fn slot(&mut self, field: ShippingField) -> &mut String {
        match field {
            ShippingField::Country => &mut self.country,
            ShippingField::Region => &mut self.region,
            ShippingField::City => &mut self.city,
            ShippingField::PostalCode => &mut self.postal_code,
            ShippingField::ShippingMethod => &mut self.shipping_method,
            ShippingField::FirstName => &mut self.first_name,
            ShippingField::LastName => &mut self.last_name,
            ShippingField::Email => &mut self.email,
            ShippingField::PhoneNumber => &mut self.phone_number,
            ShippingField::Address1 => &mut self.address1,
            ShippingField::Address2 => &mut self.address2,
        }
    }

    pub fn set(&mut self, field: ShippingField, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    pub fn get(&self, field: ShippingField) -> &str {
        match field {
            ShippingField::Country => &self.country,
            ShippingField::Region => &self.region,
            ShippingField::City => &self.city,
            ShippingField::PostalCode => &self.postal_code,
            ShippingField::ShippingMethod => &self.shipping_method,
            ShippingField::FirstName => &self.first_name,
            ShippingField::LastName => &self.last_name,
            ShippingField::Email => &self.email,
            ShippingField::PhoneNumber => &self.phone_number,
            ShippingField::Address1 => &self.address1,
            ShippingField::Address2 => &self.address2,
        }
    }

    /// The address tuple sent to the shipping cost endpoint.
    pub fn address(&self) -> ShippingAddress {
        ShippingAddress {
            country_iso_code: self.country.clone(),
            region: self.region.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
        }
    }

    /// A shipping method is chosen and the address tuple is complete.
    pub fn is_info_set(&self) -> bool {
        !self.shipping_method.is_empty() && self.address().is_complete()
    }

    /// Everything needed to place the order. The second address line is optional.
    pub fn is_complete(&self) -> bool {
        self.is_info_set()
            && [
                &self.first_name,
                &self.last_name,
                &self.email,
                &self.phone_number,
                &self.address1,
            ]
            .iter()
            .all(|v| !v.is_empty())
    }
}

/// Payment details as entered by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDetails {
    pub payment_method: String,
    pub card_number: String,
    pub card_holder: String,
    pub card_expiry: String,
    pub card_cvc: String,
}

impl PaymentDetails {
    pub fn set(&mut self, field: PaymentField, value: impl Into<String>) {
        let slot = match field {
            PaymentField::PaymentMethod => &mut self.payment_method,
            PaymentField::CardNumber => &mut self.card_number,
            PaymentField::CardHolder => &mut self.card_holder,
            PaymentField::CardExpiry => &mut self.card_expiry,
            PaymentField::CardCvc => &mut self.card_cvc,
        };
        *slot = value.into();
    }

    pub fn get(&self, field: PaymentField) -> &str {
        match field {
            PaymentField::PaymentMethod => &self.payment_method,
            PaymentField::CardNumber => &self.card_number,
            PaymentField::CardHolder => &self.card_holder,
            PaymentField::CardExpiry => &self.card_expiry,
            PaymentField::CardCvc => &self.card_cvc,
        }
    }

    pub fn has_card(&self) -> bool {
        [
            &self.card_number,
            &self.card_holder,
            &self.card_expiry,
            &self.card_cvc,
        ]
        .iter()
        .all(|v| !v.is_empty())
    }
}
