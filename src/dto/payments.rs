use sea_orm::Iterable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::payments::PaymentMethod,
    models::{Order, Payment},
};

pub const METHOD_REQUIRED_MESSAGE: &str = "Please select a payment method.";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub payment_method: Option<String>,
    pub card_last_four: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentMethodOption {
    pub value: PaymentMethod,
    pub label: String,
}

impl PaymentMethodOption {
    pub fn all() -> Vec<Self> {
        PaymentMethod::iter()
            .map(|value| Self {
                value,
                label: value.label().to_string(),
            })
            .collect()
    }
}

/// Payment page contents; `error` is set when a submission is rejected.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentForm {
    pub order: Order,
    pub payment_methods: Vec<PaymentMethodOption>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentReceipt {
    pub order: Order,
    pub payment: Payment,
}
