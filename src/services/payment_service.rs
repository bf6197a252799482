use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    dto::{
        orders::OrderWithItems,
        payments::{METHOD_REQUIRED_MESSAGE, PaymentForm, PaymentMethodOption, PaymentReceipt, PaymentRequest},
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, OrderStatus},
        payments::{
            ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments, PaymentMethod,
            PaymentStatus,
        },
    },
    error::{AppError, AppResult},
    identifiers::unique_transaction_id,
    middleware::auth::AuthUser,
    models::{Order, Payment},
    services::order_service::{find_owned_order, with_items},
    state::AppState,
};

#[derive(Debug)]
pub enum PaymentPage {
    /// The order already has a payment; go to its confirmation.
    AlreadyPaid { order_id: Uuid },
    Form(PaymentForm),
}

#[derive(Debug)]
pub enum PaymentOutcome {
    AlreadyPaid { order_id: Uuid },
    Completed(PaymentReceipt),
    /// No usable method was submitted. Nothing was written.
    MethodRequired(PaymentForm),
}

fn form(order: Order, error: Option<&str>) -> PaymentForm {
    PaymentForm {
        order,
        payment_methods: PaymentMethodOption::all(),
        error: error.map(str::to_string),
    }
}

fn parse_method(raw: Option<&str>) -> Option<PaymentMethod> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Keeps the last four digits only for card payments and only when they
/// are exactly four ASCII digits.
fn card_last_four(method: PaymentMethod, raw: Option<String>) -> Option<String> {
    if !method.is_card() {
        return None;
    }
    raw.map(|s| s.trim().to_string())
        .filter(|s| s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()))
}

pub async fn payment_form(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<PaymentPage> {
    let order = find_owned_order(&state.orm, user, order_id).await?;
    let paid = Payments::find()
        .filter(PaymentCol::OrderId.eq(order.id))
        .one(&state.orm)
        .await?
        .is_some();
    if paid {
        return Ok(PaymentPage::AlreadyPaid { order_id: order.id });
    }
    Ok(PaymentPage::Form(form(order.into(), None)))
}

/// Records a simulated, always-successful payment and moves the order to
/// processing. Re-submissions for a paid order create nothing.
pub async fn pay(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: PaymentRequest,
) -> AppResult<PaymentOutcome> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(order_id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = Payments::find()
        .filter(PaymentCol::OrderId.eq(order.id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        tracing::debug!(order_id = %order.id, "payment already recorded");
        return Ok(PaymentOutcome::AlreadyPaid { order_id: order.id });
    }

    let Some(method) = parse_method(payload.payment_method.as_deref()) else {
        return Ok(PaymentOutcome::MethodRequired(form(
            order.into(),
            Some(METHOD_REQUIRED_MESSAGE),
        )));
    };

    let transaction_id = unique_transaction_id(&txn).await?;
    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        payment_method: Set(method),
        payment_status: Set(PaymentStatus::Completed),
        transaction_id: Set(Some(transaction_id)),
        amount: Set(order.total_amount),
        card_last_four: Set(card_last_four(method, payload.card_last_four)),
        payment_date: NotSet,
    }
    .insert(&txn)
    .await?;

    let order = if order.status.can_transition_to(OrderStatus::Processing) {
        let mut active: OrderActive = order.into();
        active.status = Set(OrderStatus::Processing);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?
    } else {
        order
    };

    txn.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        order_id = %order.id,
        transaction_id = payment.transaction_id.as_deref().unwrap_or("-"),
        method = ?method,
        "payment completed"
    );
    record(
        &state.pool,
        user.user_id,
        AuditAction::PaymentCompleted,
        serde_json::json!({
            "order_id": order.id,
            "payment_id": payment.id,
            "transaction_id": payment.transaction_id,
        }),
    )
    .await;

    Ok(PaymentOutcome::Completed(PaymentReceipt {
        order: Order::from(order),
        payment: Payment::from(payment),
    }))
}

/// Confirmation view: the order with its items and payment.
pub async fn payment_success(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<OrderWithItems> {
    let order = find_owned_order(&state.orm, user, order_id).await?;
    with_items(&state.orm, order).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_unknown_method_is_rejected() {
        assert_eq!(parse_method(None), None);
        assert_eq!(parse_method(Some("  ")), None);
        assert_eq!(parse_method(Some("cheque")), None);
        assert_eq!(parse_method(Some("upi")), Some(PaymentMethod::Upi));
    }

    #[test]
    fn last_four_kept_only_for_valid_card_digits() {
        assert_eq!(
            card_last_four(PaymentMethod::CreditCard, Some("4242".into())),
            Some("4242".into())
        );
        assert_eq!(card_last_four(PaymentMethod::DebitCard, Some("42a2".into())), None);
        assert_eq!(card_last_four(PaymentMethod::CreditCard, Some("42424".into())), None);
        assert_eq!(card_last_four(PaymentMethod::Paypal, Some("4242".into())), None);
    }
}
