use axum::{
    Form, Json, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

use crate::{
    dto::orders::{CheckoutRequest, CheckoutView},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::{CART_PATH, payment_path},
    services::checkout_service::{self, CheckoutOutcome},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/checkout/", get(checkout_page).post(checkout_submit))
}

#[utoipa::path(
    get,
    path = "/checkout/",
    responses(
        (status = 200, description = "Cart summary and prefilled shipping form", body = ApiResponse<CheckoutView>),
        (status = 303, description = "Cart is empty; redirects to the cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn checkout_page(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    let resp = match checkout_service::checkout_form(&state, &user).await? {
        Some(view) => Json(ApiResponse::success("Checkout", view, None)).into_response(),
        None => Redirect::to(CART_PATH).into_response(),
    };
    Ok(resp)
}

#[utoipa::path(
    post,
    path = "/checkout/",
    request_body(content = CheckoutRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Order placed; redirects to payment, or to the cart when empty"),
        (status = 422, description = "Missing shipping fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn checkout_submit(
    State(state): State<AppState>,
    user: AuthUser,
    Form(payload): Form<CheckoutRequest>,
) -> AppResult<Redirect> {
    let redirect = match checkout_service::place_order(&state, &user, payload).await? {
        CheckoutOutcome::EmptyCart => Redirect::to(CART_PATH),
        CheckoutOutcome::Placed(placed) => Redirect::to(&payment_path(placed.order.id)),
    };
    Ok(redirect)
}
