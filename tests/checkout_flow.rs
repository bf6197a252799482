use jamazon_api::{
    dto::{catalog::UpdateProductRequest, orders::CheckoutRequest, profile::UpdateProfileRequest},
    entity::orders::OrderStatus,
    error::AppError,
    routes::params::Pagination,
    services::{
        cart_service, catalog_service,
        checkout_service::{self, CheckoutOutcome},
        order_service, profile_service,
    },
};
use axum::http::StatusCode;
use jamazon_api::routes::{CART_PATH, payment_path};
use rust_decimal::Decimal;

mod common;

#[tokio::test]
async fn checkout_snapshots_prices_and_clears_cart() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let user = common::create_user(&state, "user").await?;
    let admin = common::create_user(&state, "admin").await?;
    let a = common::create_product(&state, 1000).await?;
    let b = common::create_product(&state, 500).await?;

    cart_service::add_to_cart(&state.pool, &user, a.id).await?;
    cart_service::add_to_cart(&state.pool, &user, a.id).await?;
    cart_service::add_to_cart(&state.pool, &user, b.id).await?;

    let placed = match checkout_service::place_order(&state, &user, common::shipping()).await? {
        CheckoutOutcome::Placed(placed) => placed,
        other => panic!("expected an order, got {other:?}"),
    };

    let order = &placed.order;
    assert_eq!(order.subtotal, Decimal::new(2500, 2));
    assert_eq!(order.tax, Decimal::ZERO);
    assert_eq!(order.shipping_cost, Decimal::ZERO);
    assert_eq!(order.total_amount, Decimal::new(2500, 2));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.city, "Springfield");
    assert!(order.order_number.starts_with("JAM-"));
    assert_eq!(order.order_number.len(), 12);

    assert_eq!(placed.items.len(), 2);
    let item_a = placed.items.iter().find(|i| i.product_id == a.id).unwrap();
    let item_b = placed.items.iter().find(|i| i.product_id == b.id).unwrap();
    assert_eq!((item_a.quantity, item_a.price), (2, Decimal::new(1000, 2)));
    assert_eq!((item_b.quantity, item_b.price), (1, Decimal::new(500, 2)));

    let count = cart_service::cart_count(&state.pool, &user).await?.data.unwrap();
    assert_eq!(count.count, 0);

    // Reprice a product after the fact; the order must not move.
    catalog_service::update_product(
        &state,
        &admin,
        a.id,
        UpdateProductRequest {
            price: Some(Decimal::new(9900, 2)),
            ..Default::default()
        },
    )
    .await?;

    let detail = order_service::get_order(&state, &user, order.id)
        .await?
        .data
        .unwrap();
    let item_a = detail.items.iter().find(|i| i.product_id == a.id).unwrap();
    assert_eq!(item_a.price, Decimal::new(1000, 2));
    assert_eq!(item_a.subtotal, Decimal::new(2000, 2));
    assert_eq!(detail.order.total_amount, Decimal::new(2500, 2));
    assert!(detail.payment.is_none());
    Ok(())
}

#[tokio::test]
async fn empty_cart_checkout_creates_nothing() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let user = common::create_user(&state, "user").await?;

    assert!(checkout_service::checkout_form(&state, &user).await?.is_none());
    let outcome = checkout_service::place_order(&state, &user, common::shipping()).await?;
    assert!(matches!(outcome, CheckoutOutcome::EmptyCart));

    let orders = order_service::list_orders(&state, &user, Pagination::default())
        .await?
        .data
        .unwrap();
    assert!(orders.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_shipping_fields_leave_cart_untouched() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let user = common::create_user(&state, "user").await?;
    let product = common::create_product(&state, 1000).await?;
    cart_service::add_to_cart(&state.pool, &user, product.id).await?;

    let err = checkout_service::place_order(
        &state,
        &user,
        CheckoutRequest {
            address_line1: None,
            country: Some(" ".into()),
            ..common::shipping()
        },
    )
    .await
    .unwrap_err();

    match err {
        AppError::Validation { fields, .. } => assert_eq!(fields, vec!["address_line1", "country"]),
        other => panic!("expected validation error, got {other:?}"),
    }

    let count = cart_service::cart_count(&state.pool, &user).await?.data.unwrap();
    assert_eq!(count.count, 1);
    let orders = order_service::list_orders(&state, &user, Pagination::default())
        .await?
        .data
        .unwrap();
    assert!(orders.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn checkout_form_is_prefilled_from_profile() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let user = common::create_user(&state, "user").await?;
    let product = common::create_product(&state, 1250).await?;
    cart_service::add_to_cart(&state.pool, &user, product.id).await?;

    profile_service::update_profile(
        &state,
        &user,
        UpdateProfileRequest {
            phone: Some("555-0199".into()),
            city: Some("Shelbyville".into()),
            ..Default::default()
        },
    )
    .await?;

    let view = checkout_service::checkout_form(&state, &user)
        .await?
        .expect("cart has items");
    assert_eq!(view.total_amount, Decimal::new(1250, 2));
    assert_eq!(view.cart_items.len(), 1);
    assert_eq!(view.shipping.full_name, "Test Shopper");
    assert_eq!(view.shipping.phone, "555-0199");
    assert_eq!(view.shipping.city, "Shelbyville");
    Ok(())
}

#[tokio::test]
async fn order_list_is_newest_first_and_owner_scoped() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let user = common::create_user(&state, "user").await?;
    let other = common::create_user(&state, "user").await?;
    let product = common::create_product(&state, 300).await?;

    let mut placed_ids = Vec::new();
    for _ in 0..2 {
        cart_service::add_to_cart(&state.pool, &user, product.id).await?;
        match checkout_service::place_order(&state, &user, common::shipping()).await? {
            CheckoutOutcome::Placed(placed) => placed_ids.push(placed.order.id),
            outcome => panic!("expected an order, got {outcome:?}"),
        }
    }

    let orders = order_service::list_orders(&state, &user, Pagination::default())
        .await?
        .data
        .unwrap();
    let listed: Vec<_> = orders.items.iter().map(|o| o.id).collect();
    assert_eq!(listed, vec![placed_ids[1], placed_ids[0]]);

    let err = order_service::get_order(&state, &other, placed_ids[0])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn checkout_routes_redirect_by_cart_state() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let user = common::create_user(&state, "user").await?;

    let response = common::send(&state, &user, "GET", "/checkout/", None).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response).as_deref(), Some(CART_PATH));

    let response =
        common::send(&state, &user, "POST", "/checkout/", Some(common::SHIPPING_FORM)).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response).as_deref(), Some(CART_PATH));

    let product = common::create_product(&state, 700).await?;
    cart_service::add_to_cart(&state.pool, &user, product.id).await?;

    let response = common::send(&state, &user, "GET", "/checkout/", None).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
        common::send(&state, &user, "POST", "/checkout/", Some(common::SHIPPING_FORM)).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let orders = order_service::list_orders(&state, &user, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(orders.items.len(), 1);
    assert_eq!(
        common::location(&response),
        Some(payment_path(orders.items[0].id))
    );
    Ok(())
}

#[tokio::test]
async fn invalid_shipping_form_is_unprocessable_and_keeps_cart() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let user = common::create_user(&state, "user").await?;
    let product = common::create_product(&state, 700).await?;
    cart_service::add_to_cart(&state.pool, &user, product.id).await?;

    let missing_city = common::SHIPPING_FORM.replace("city=Springfield", "city=");
    let response = common::send(&state, &user, "POST", "/checkout/", Some(&missing_city)).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::json_body(response).await?;
    assert_eq!(body["data"]["fields"], serde_json::json!(["city"]));

    let long_phone = common::SHIPPING_FORM.replace("phone=555-0100", &format!("phone={}", "5".repeat(25)));
    let response = common::send(&state, &user, "POST", "/checkout/", Some(&long_phone)).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::json_body(response).await?;
    assert_eq!(body["data"]["fields"], serde_json::json!(["phone"]));

    let count = cart_service::cart_count(&state.pool, &user).await?.data.unwrap();
    assert_eq!(count.count, 1);
    let orders = order_service::list_orders(&state, &user, Pagination::default())
        .await?
        .data
        .unwrap();
    assert!(orders.items.is_empty());
    Ok(())
}
