use axum::{
    Json, Router,
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{CartCount, CartDetail},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::CART_PATH,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart/", get(cart_detail))
        .route("/cart/count/", get(cart_count))
        .route("/cart/add/{product_id}/", post(cart_add))
        .route("/cart/remove/{product_id}/", post(cart_remove))
        .route("/cart/clear/", post(cart_clear))
}

#[utoipa::path(
    get,
    path = "/cart/",
    responses(
        (status = 200, description = "Cart lines with subtotals and total", body = ApiResponse<CartDetail>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_detail(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    let resp = cart_service::list_cart(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/cart/count/",
    responses(
        (status = 200, description = "Number of cart entries", body = ApiResponse<CartCount>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    let resp = cart_service::cart_count(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/cart/add/{product_id}/",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 303, description = "Added; redirects to the cart"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_add(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Redirect> {
    cart_service::add_to_cart(&state.pool, &user, product_id).await?;
    Ok(Redirect::to(CART_PATH))
}

#[utoipa::path(
    post,
    path = "/cart/remove/{product_id}/",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 303, description = "Removed; redirects to the cart"),
        (status = 404, description = "Cart entry not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Redirect> {
    cart_service::remove_from_cart(&state.pool, &user, product_id).await?;
    Ok(Redirect::to(CART_PATH))
}

#[utoipa::path(
    post,
    path = "/cart/clear/",
    responses(
        (status = 303, description = "Cleared; redirects to the cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_clear(State(state): State<AppState>, user: AuthUser) -> AppResult<Redirect> {
    cart_service::clear_cart(&state.pool, &user).await?;
    Ok(Redirect::to(CART_PATH))
}
