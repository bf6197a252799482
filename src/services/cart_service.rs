use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    db::DbPool,
    dto::cart::{CartCount, CartDetail, CartLine},
    entity::cart_items::{Column as CartCol, Entity as CartItems},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, Product},
    pricing::line_subtotal,
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    category_id: Uuid,
    name: String,
    slug: String,
    description: String,
    price: Decimal,
    stock: i32,
    available: bool,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartWithProductRow> for CartLine {
    fn from(row: CartWithProductRow) -> Self {
        CartLine {
            id: row.cart_id,
            subtotal: line_subtotal(row.price, row.quantity),
            quantity: row.quantity,
            product: Product {
                id: row.product_id,
                category_id: row.category_id,
                name: row.name,
                slug: row.slug,
                description: row.description,
                price: row.price,
                stock: row.stock,
                available: row.available,
                image: row.image,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

/// Current cart lines with live product prices, oldest first.
pub async fn cart_lines(pool: &DbPool, user: &AuthUser) -> AppResult<Vec<CartLine>> {
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               p.id AS product_id, p.category_id, p.name, p.slug, p.description,
               p.price, p.stock, p.available, p.image, p.created_at, p.updated_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at ASC, ci.id ASC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CartLine::from).collect())
}

pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(|line| line.subtotal).sum()
}

pub async fn list_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CartDetail>> {
    let items = cart_lines(pool, user).await?;
    let total_price = cart_total(&items);
    let meta = Meta::single_page(items.len());
    Ok(ApiResponse::success(
        "OK",
        CartDetail { items, total_price },
        Some(meta),
    ))
}

pub async fn cart_count(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CartCount>> {
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;
    Ok(ApiResponse::success("OK", CartCount { count: total.0 }, None))
}

/// Adds one unit of the product, creating the entry on first add.
pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartItem>> {
    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::NotFound);
    }

    let cart_item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity)
        VALUES ($1, $2, $3, 1)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + 1
        RETURNING id, user_id, product_id, quantity, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(product_id)
    .fetch_one(pool)
    .await?;

    tracing::debug!(
        user_id = %user.user_id,
        product_id = %product_id,
        quantity = cart_item.quantity,
        "cart updated"
    );
    record(
        pool,
        user.user_id,
        AuditAction::CartAdd,
        serde_json::json!({ "product_id": product_id, "quantity": cart_item.quantity }),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", cart_item, None))
}

pub async fn remove_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE product_id = $1 AND user_id = $2")
        .bind(product_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    record(
        pool,
        user.user_id,
        AuditAction::CartRemove,
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Deletes the given lines of the user's cart and nothing else, so rows
/// added after a checkout snapshot survive it.
pub async fn remove_lines<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    line_ids: &[Uuid],
) -> AppResult<u64> {
    if line_ids.is_empty() {
        return Ok(0);
    }
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::Id.is_in(line_ids.iter().copied()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn clear_cart(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(pool)
        .await?;

    record(
        pool,
        user.user_id,
        AuditAction::CartClear,
        serde_json::json!({ "removed": result.rows_affected() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({ "removed": result.rows_affected() }),
        Some(Meta::empty()),
    ))
}
