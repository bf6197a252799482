use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::OrderWithItems,
        payments::{METHOD_REQUIRED_MESSAGE, PaymentForm, PaymentRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::payment_success_path,
    services::payment_service::{self, PaymentOutcome, PaymentPage},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payment/{order_id}/", get(payment_page).post(payment_submit))
        .route("/payment-success/{order_id}/", get(payment_success))
}

#[utoipa::path(
    get,
    path = "/payment/{order_id}/",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order and available payment methods", body = ApiResponse<PaymentForm>),
        (status = 303, description = "Already paid; redirects to the confirmation"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn payment_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Response> {
    let resp = match payment_service::payment_form(&state, &user, order_id).await? {
        PaymentPage::AlreadyPaid { order_id } => {
            Redirect::to(&payment_success_path(order_id)).into_response()
        }
        PaymentPage::Form(form) => Json(ApiResponse::success("Payment", form, None)).into_response(),
    };
    Ok(resp)
}

#[utoipa::path(
    post,
    path = "/payment/{order_id}/",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    request_body(content = PaymentRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Paid (or already paid); redirects to the confirmation"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "No valid payment method selected", body = ApiResponse<PaymentForm>),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn payment_submit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
    Form(payload): Form<PaymentRequest>,
) -> AppResult<Response> {
    let resp = match payment_service::pay(&state, &user, order_id, payload).await? {
        PaymentOutcome::AlreadyPaid { order_id } => {
            Redirect::to(&payment_success_path(order_id)).into_response()
        }
        PaymentOutcome::Completed(receipt) => {
            Redirect::to(&payment_success_path(receipt.order.id)).into_response()
        }
        PaymentOutcome::MethodRequired(form) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::success(METHOD_REQUIRED_MESSAGE, form, None)),
        )
            .into_response(),
    };
    Ok(resp)
}

#[utoipa::path(
    get,
    path = "/payment-success/{order_id}/",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order confirmation", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn payment_success(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let data = payment_service::payment_success(&state, &user, order_id).await?;
    Ok(Json(ApiResponse::success("Payment successful", data, None)))
}
