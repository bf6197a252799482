use rust_decimal::Decimal;
use uuid::Uuid;

use jamazon_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@example.com", "admin12345", "admin").await?;
    let user_id = ensure_user(&pool, "shopper", "shopper@example.com", "shopper12345", "user").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(pool)
        .await?;

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(pool: &DbPool) -> anyhow::Result<()> {
    let categories = [
        ("Apparel", "apparel", "Things to wear"),
        ("Kitchen", "kitchen", "Mugs and more"),
        ("Books", "books", "Reading material"),
    ];
    for (name, slug, description) in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(description)
        .execute(pool)
        .await?;
    }

    let products = [
        ("apparel", "Jamazon Hoodie", "jamazon-hoodie", "Warm hoodie", 4999_i64, 50),
        ("kitchen", "Ferris Mug", "ferris-mug", "Coffee tastes better with Ferris", 1200, 100),
        ("apparel", "Sticker Pack", "sticker-pack", "Decorate your laptop", 500, 200),
        ("books", "Async Patterns", "async-patterns", "An e-book on async design", 2500, 75),
    ];
    for (category_slug, name, slug, description, cents, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, slug, description, price, stock)
            SELECT $1, c.id, $2, $3, $4, $5, $6 FROM categories c WHERE c.slug = $7
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(Decimal::new(cents, 2))
        .bind(stock)
        .bind(category_slug)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
