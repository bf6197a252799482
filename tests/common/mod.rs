#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use jamazon_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::orders::CheckoutRequest,
    entity::{
        categories::ActiveModel as CategoryActive, products::ActiveModel as ProductActive,
        products::Model as ProductModel, user_profiles::ActiveModel as ProfileActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    services::auth_service::issue_token,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::Set;
use tower::ServiceExt;
use uuid::Uuid;

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        db_max_connections: 5,
    }
}

/// Connects to the test database, or returns `None` so the caller can skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            return Ok(None);
        }
    };

    let config = test_config(&database_url);
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;
    Ok(Some(AppState::new(pool, &config)))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub async fn create_user(state: &AppState, role: &str) -> anyhow::Result<AuthUser> {
    let username = unique("user");
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.clone()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set("dummy".into()),
        first_name: Set("Test".into()),
        last_name: Set("Shopper".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    ProfileActive {
        user_id: Set(user.id),
        phone: Set(String::new()),
        address_line1: Set(String::new()),
        address_line2: Set(String::new()),
        city: Set(String::new()),
        state: Set(String::new()),
        zip_code: Set(String::new()),
        country: Set(String::new()),
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: role.into(),
    })
}

/// Creates a product (in a fresh category) priced at `cents / 100`.
pub async fn create_product(state: &AppState, cents: i64) -> anyhow::Result<ProductModel> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set("Test Category".into()),
        slug: Set(unique("cat")),
        description: Set(String::new()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        name: Set("Test Widget".into()),
        slug: Set(unique("widget")),
        description: Set("A product for testing".into()),
        price: Set(Decimal::new(cents, 2)),
        stock: Set(10),
        available: Set(true),
        image: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product)
}

pub fn shipping() -> CheckoutRequest {
    CheckoutRequest {
        full_name: Some("Test Shopper".into()),
        email: Some("shopper@example.com".into()),
        phone: Some("555-0100".into()),
        address_line1: Some("1 Test Street".into()),
        address_line2: None,
        city: Some("Springfield".into()),
        state: Some("IL".into()),
        zip_code: Some("62701".into()),
        country: Some("US".into()),
    }
}

pub const SHIPPING_FORM: &str = "full_name=Test+Shopper&email=shopper%40example.com&phone=555-0100\
&address_line1=1+Test+Street&city=Springfield&state=IL&zip_code=62701&country=US";

/// Sends a request through a fresh router as `user`. A `Some` body is posted
/// as an urlencoded form.
pub async fn send(
    state: &AppState,
    user: &AuthUser,
    method: &str,
    uri: &str,
    form: Option<&str>,
) -> anyhow::Result<Response<Body>> {
    let token = issue_token(user.user_id, &user.role, &state.auth)?;
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    let request = match form {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };
    let app: Router = jamazon_api::routes::build_app(state.clone());
    Ok(app.oneshot(request).await?)
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub async fn json_body(response: Response<Body>) -> anyhow::Result<serde_json::Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
