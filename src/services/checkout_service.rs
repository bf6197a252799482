use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    dto::orders::{CheckoutRequest, CheckoutView, OrderWithItems, ShippingDetails},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::ActiveModel as OrderItemActive,
        orders::{ActiveModel as OrderActive, OrderStatus},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    identifiers::unique_order_number,
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    pricing::{ChargePolicy, NoCharges, cart_subtotal},
    services::{cart_service, profile_service::load_user_and_profile},
    state::AppState,
};

#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Nothing to check out; the caller goes back to the cart.
    EmptyCart,
    Placed(OrderWithItems),
}

/// Checkout page data, or `None` when the cart is empty.
pub async fn checkout_form(state: &AppState, user: &AuthUser) -> AppResult<Option<CheckoutView>> {
    let cart_items = cart_service::cart_lines(&state.pool, user).await?;
    if cart_items.is_empty() {
        return Ok(None);
    }

    let (account, profile) = load_user_and_profile(&state.orm, user).await?;
    let shipping = ShippingDetails {
        full_name: account.full_name(),
        email: account.email,
        phone: profile.phone,
        address_line1: profile.address_line1,
        address_line2: profile.address_line2,
        city: profile.city,
        state: profile.state,
        zip_code: profile.zip_code,
        country: profile.country,
    };

    Ok(Some(CheckoutView {
        total_amount: cart_service::cart_total(&cart_items),
        cart_items,
        shipping,
    }))
}

/// Turns the cart into an order with price-snapshotted items and empties
/// the cart. All three writes share one transaction.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<CheckoutOutcome> {
    place_order_with(state, user, payload, &NoCharges).await
}

pub async fn place_order_with<P: ChargePolicy>(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
    charges: &P,
) -> AppResult<CheckoutOutcome> {
    let txn = state.orm.begin().await?;

    let cart = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_asc(CartCol::CreatedAt)
        .order_by_asc(CartCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if cart.is_empty() {
        return Ok(CheckoutOutcome::EmptyCart);
    }

    let shipping = payload.validate()?;

    let product_ids: Vec<Uuid> = cart.iter().map(|item| item.product_id).collect();
    let prices: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product.price))
        .collect();

    let mut lines = Vec::with_capacity(cart.len());
    for item in &cart {
        let price = *prices.get(&item.product_id).ok_or(AppError::NotFound)?;
        lines.push((item.product_id, item.quantity, price));
    }

    let totals = charges.totals(cart_subtotal(
        lines.iter().map(|(_, quantity, price)| (*price, *quantity)),
    ));
    let order_number = unique_order_number(&txn).await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        order_number: Set(order_number),
        user_id: Set(user.user_id),
        full_name: Set(shipping.full_name),
        email: Set(shipping.email),
        phone: Set(shipping.phone),
        address_line1: Set(shipping.address_line1),
        address_line2: Set(shipping.address_line2),
        city: Set(shipping.city),
        state: Set(shipping.state),
        zip_code: Set(shipping.zip_code),
        country: Set(shipping.country),
        subtotal: Set(totals.subtotal),
        tax: Set(totals.tax),
        shipping_cost: Set(totals.shipping_cost),
        total_amount: Set(totals.total_amount),
        status: Set(OrderStatus::Pending),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for (product_id, quantity, price) in lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            price: Set(price),
        }
        .insert(&txn)
        .await?;
        items.push(item.into());
    }

    let ordered: Vec<Uuid> = cart.iter().map(|item| item.id).collect();
    cart_service::remove_lines(&txn, user, &ordered).await?;

    txn.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        order_id = %order.id,
        order_number = %order.order_number,
        total = %order.total_amount,
        "order placed"
    );
    record(
        &state.pool,
        user.user_id,
        AuditAction::Checkout,
        serde_json::json!({ "order_id": order.id, "order_number": order.order_number }),
    )
    .await;

    Ok(CheckoutOutcome::Placed(OrderWithItems {
        order: Order::from(order),
        items,
        payment: None,
    }))
}
