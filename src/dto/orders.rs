use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::cart::CartLine,
    error::AppError,
    models::{Order, OrderItem, Payment},
};

/// Shipping form as submitted; every field may be absent.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Shipping snapshot copied onto the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShippingDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

// Column widths of the shipping snapshot on `orders`.
const FULL_NAME_MAX: usize = 200;
const EMAIL_MAX: usize = 254;
const PHONE_MAX: usize = 20;
const ADDRESS_MAX: usize = 255;
const REGION_MAX: usize = 100;
const ZIP_CODE_MAX: usize = 20;

impl CheckoutRequest {
    pub fn validate(self) -> Result<ShippingDetails, AppError> {
        let mut missing = Vec::new();
        let mut too_long = Vec::new();
        let mut field = |value: Option<String>, name: &'static str, required: bool, max: usize| {
            let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
            if required && value.is_empty() {
                missing.push(name);
            } else if value.chars().count() > max {
                too_long.push(name);
            }
            value
        };

        let details = ShippingDetails {
            full_name: field(self.full_name, "full_name", true, FULL_NAME_MAX),
            email: field(self.email, "email", true, EMAIL_MAX),
            phone: field(self.phone, "phone", true, PHONE_MAX),
            address_line1: field(self.address_line1, "address_line1", true, ADDRESS_MAX),
            address_line2: field(self.address_line2, "address_line2", false, ADDRESS_MAX),
            city: field(self.city, "city", true, REGION_MAX),
            state: field(self.state, "state", true, REGION_MAX),
            zip_code: field(self.zip_code, "zip_code", true, ZIP_CODE_MAX),
            country: field(self.country, "country", true, REGION_MAX),
        };

        if !missing.is_empty() {
            return Err(AppError::Validation {
                message: format!("Missing shipping fields: {}", missing.join(", ")),
                fields: missing,
            });
        }
        if !too_long.is_empty() {
            return Err(AppError::Validation {
                message: format!("Shipping fields too long: {}", too_long.join(", ")),
                fields: too_long,
            });
        }
        Ok(details)
    }
}

/// What the checkout page shows before submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutView {
    pub cart_items: Vec<CartLine>,
    pub total_amount: Decimal,
    pub shipping: ShippingDetails,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Option<Payment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> CheckoutRequest {
        CheckoutRequest {
            full_name: Some("Ada Lovelace".into()),
            email: Some("ada@example.com".into()),
            phone: Some("555-0100".into()),
            address_line1: Some("12 Analytical Way".into()),
            address_line2: None,
            city: Some("London".into()),
            state: Some("Greater London".into()),
            zip_code: Some("N1".into()),
            country: Some("UK".into()),
        }
    }

    #[test]
    fn complete_form_validates_with_optional_second_line() {
        let details = complete().validate().expect("valid");
        assert_eq!(details.full_name, "Ada Lovelace");
        assert_eq!(details.address_line2, "");
    }

    #[test]
    fn blank_and_absent_fields_are_reported() {
        let request = CheckoutRequest {
            city: Some("   ".into()),
            phone: None,
            ..complete()
        };
        match request.validate() {
            Err(AppError::Validation { fields, .. }) => {
                assert_eq!(fields, vec!["phone", "city"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn over_long_fields_are_reported() {
        let request = CheckoutRequest {
            phone: Some("5".repeat(25)),
            address_line2: Some("x".repeat(256)),
            ..complete()
        };
        match request.validate() {
            Err(AppError::Validation { message, fields }) => {
                assert_eq!(fields, vec!["phone", "address_line2"]);
                assert!(message.contains("too long"), "{message}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let request = CheckoutRequest {
            city: Some("é".repeat(100)),
            ..complete()
        };
        assert!(request.validate().is_ok());
    }
}
