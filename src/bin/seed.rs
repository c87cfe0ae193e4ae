use store_management_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2, config.db_timeout).await?;
    // Ensure migrations are applied.
    run_migrations(&orm_from_pool(&pool)).await?;

    let owner_id = ensure_owner(&pool, "Demo Store", "owner@example.com", "owner123").await?;
    seed_products(&pool, owner_id).await?;

    println!("Seed completed. Owner ID: {owner_id}");
    Ok(())
}

async fn ensure_owner(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO owners (id, name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If the owner already exists, fetch id
    let owner_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM owners WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured owner {email}");
    Ok(owner_id)
}

async fn seed_products(pool: &sqlx::PgPool, owner_id: Uuid) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        println!("Products already seeded");
        return Ok(());
    }

    let products = vec![
        ("Basmati Rice 5kg", 89900_i64, 40_i32, "/static/img/rice.png"),
        ("Sunflower Oil 1L", 17500, 120, "/static/img/oil.png"),
        ("Green Tea 100 bags", 32000, 60, "/static/img/tea.png"),
        ("Dish Soap", 9900, 8, "/static/img/soap.png"),
    ];

    for (name, price, quantity, image_ref) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, owner_id, name, price, quantity, image_ref)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(name)
        .bind(price)
        .bind(quantity)
        .bind(image_ref)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
