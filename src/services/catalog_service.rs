use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    dto::catalog::{
        CategoryList, CreateCategoryRequest, CreateProductRequest, ProductList,
        UpdateProductRequest,
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(ApiResponse::success("Categories", CategoryList { items }, None))
}

/// Available products, optionally narrowed to one category by slug.
pub async fn list_products(
    state: &AppState,
    category_slug: Option<&str>,
) -> AppResult<ApiResponse<ProductList>> {
    let category = match category_slug {
        Some(slug) => Some(
            Categories::find()
                .filter(CategoryCol::Slug.eq(slug))
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?,
        ),
        None => None,
    };

    let mut finder = Products::find().filter(ProdCol::Available.eq(true));
    if let Some(category) = &category {
        finder = finder.filter(ProdCol::CategoryId.eq(category.id));
    }

    let items: Vec<Product> = finder
        .order_by_asc(ProdCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::single_page(items.len());
    Ok(ApiResponse::success(
        "Products",
        ProductList {
            category: category.map(Category::from),
            items,
        },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, slug: &str) -> AppResult<ApiResponse<Product>> {
    let product = Products::find()
        .filter(ProdCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product.into(), None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    ensure_slug(&payload.slug)?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::CategoryCreate,
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    ensure_slug(&payload.slug)?;
    ensure_price(payload.price)?;
    ensure_stock(payload.stock)?;

    if Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("category not found".into()));
    }

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(payload.stock),
        available: Set(payload.available),
        image: Set(payload.image),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::ProductCreate,
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product.into(),
        Some(Meta::empty()),
    ))
}

/// Partial update. Price changes never touch existing order items.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ProductActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        ensure_price(price)?;
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        ensure_stock(stock)?;
        active.stock = Set(stock);
    }
    if let Some(available) = payload.available {
        active.available = Set(available);
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::ProductUpdate,
        serde_json::json!({ "product_id": product.id, "price": product.price }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

fn ensure_slug(slug: &str) -> AppResult<()> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::BadRequest(
            "slug must be lowercase letters, digits, '-' or '_'".into(),
        ));
    }
    Ok(())
}

fn ensure_price(price: Decimal) -> AppResult<()> {
    if price.is_sign_negative() || price.scale() > 2 {
        return Err(AppError::BadRequest(
            "price must be non-negative with at most two decimal places".into(),
        ));
    }
    Ok(())
}

fn ensure_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_lowercase_url_safe() {
        assert!(ensure_slug("rust-mug_2").is_ok());
        assert!(ensure_slug("Rust Mug").is_err());
        assert!(ensure_slug("").is_err());
    }

    #[test]
    fn prices_are_non_negative_cents() {
        assert!(ensure_price(Decimal::new(1999, 2)).is_ok());
        assert!(ensure_price(Decimal::new(-1, 0)).is_err());
        assert!(ensure_price(Decimal::new(19999, 3)).is_err());
    }
}
