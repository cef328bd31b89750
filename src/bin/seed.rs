use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_marketplace_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let seller_id = ensure_user(&pool, "Alice", "seller@example.com", "seller123", 0).await?;
    let buyer_id = ensure_user(&pool, "Bob", "buyer@example.com", "buyer123", 10_000_00).await?;
    let category_id = ensure_category(&pool, "Electronics").await?;
    seed_products(&pool, seller_id, category_id).await?;

    println!("Seed completed. Seller ID: {seller_id}, Buyer ID: {buyer_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    funds: i64,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name_first, email, password_hash, funds)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(funds)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email}");
    Ok(user_id)
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_optional(pool)
    .await?;

    let category_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
                .bind(name)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured category {name}");
    Ok(category_id)
}

async fn seed_products(
    pool: &sqlx::PgPool,
    owner_id: Uuid,
    category_id: Uuid,
) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        println!("Products already seeded");
        return Ok(());
    }

    let products = vec![
        ("Mechanical Keyboard", "Hot-swappable switches", 550_00, 50),
        ("USB-C Hub", "Seven ports, aluminium body", 120_00, 100),
        ("Webcam Cover Pack", "Slide covers for laptops", 15_00, 200),
        ("Noise-cancelling Headset", "Wired, with boom mic", 890_00, 75),
    ];

    for (name, desc, price, quantity) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, owner_id, category_id, name, description, price, quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(category_id)
        .bind(name)
        .bind(desc)
        .bind(price as i64)
        .bind(quantity)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
