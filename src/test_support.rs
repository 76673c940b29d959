use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;

use crate::database::DbPool;
use crate::models::listing::Listing;
use crate::models::user::User;
use crate::store;

/// In-memory database running the real migrations. Single connection so the
/// memory database is shared across queries.
pub async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    crate::database::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Arc::new(pool)
}

pub async fn insert_user(pool: &DbPool, email: &str, verified: bool) -> User {
    let name = email.split('@').next().unwrap_or("user").to_string();
    let mut user = User::new(
        email.to_string(),
        name,
        "test-hash".to_string(),
        "000000".to_string(),
    );
    if verified {
        user.email_verified = 1;
        user.verification_code = None;
    }

    store::user::insert(pool, &user)
        .await
        .expect("Failed to insert test user");
    user
}

pub async fn insert_admin(pool: &DbPool, email: &str) -> User {
    let mut user = insert_user(pool, email, true).await;
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = ?")
        .bind(&user.id)
        .execute(pool.as_ref())
        .await
        .expect("Failed to promote test admin");
    user.role = "admin".to_string();
    user
}

pub async fn insert_listing(pool: &DbPool, owner_id: &str, title: &str) -> Listing {
    let listing = Listing::new(
        owner_id.to_string(),
        title.to_string(),
        Some(format!("{} in good condition", title)),
        2500,
        None,
    );

    store::listing::insert(pool, &listing)
        .await
        .expect("Failed to insert test listing");
    listing
}
