//! Human-facing identifiers for orders and payments.
//!
//! Both are short random hex tokens. Candidates are checked against the
//! table before use and regenerated on collision; the UNIQUE constraints in
//! the schema remain the final guard.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        payments::{Column as PaymentCol, Entity as Payments},
    },
    error::{AppError, AppResult},
};

pub const ORDER_NUMBER_PREFIX: &str = "JAM-";
pub const TRANSACTION_ID_PREFIX: &str = "TXN-";
pub const MAX_ATTEMPTS: usize = 5;

const ORDER_TOKEN_LEN: usize = 8;
const TRANSACTION_TOKEN_LEN: usize = 10;

pub fn order_number() -> String {
    format!("{ORDER_NUMBER_PREFIX}{}", hex_token(ORDER_TOKEN_LEN))
}

pub fn transaction_id() -> String {
    format!("{TRANSACTION_ID_PREFIX}{}", hex_token(TRANSACTION_TOKEN_LEN))
}

fn hex_token(len: usize) -> String {
    // The first 12 hex digits of a v4 uuid are all random.
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(len);
    token.make_ascii_uppercase();
    token
}

pub async fn unique_order_number<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for attempt in 1..=MAX_ATTEMPTS {
        let candidate = order_number();
        let taken = Orders::find()
            .filter(OrderCol::OrderNumber.eq(candidate.as_str()))
            .count(conn)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
        tracing::warn!(attempt, order_number = %candidate, "order number collision");
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique order number"
    )))
}

pub async fn unique_transaction_id<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for attempt in 1..=MAX_ATTEMPTS {
        let candidate = transaction_id();
        let taken = Payments::find()
            .filter(PaymentCol::TransactionId.eq(candidate.as_str()))
            .count(conn)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
        tracing::warn!(attempt, transaction_id = %candidate, "transaction id collision");
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique transaction id"
    )))
}
