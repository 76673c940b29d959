use crate::database::DbPool;
use crate::models::user::User;
use crate::utils::error::AppResult;

pub async fn find_by_id(pool: &DbPool, id: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &DbPool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER(?)")
        .bind(email)
        .fetch_optional(pool.as_ref())
        .await?;

    Ok(user)
}

pub async fn insert(pool: &DbPool, user: &User) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, profile_pic_url, role, email_verified, verification_code, blocked, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(&user.profile_pic_url)
    .bind(&user.role)
    .bind(user.email_verified)
    .bind(&user.verification_code)
    .bind(user.blocked)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(pool.as_ref())
    .await?;

    Ok(())
}

pub async fn mark_verified(pool: &DbPool, user_id: &str) -> AppResult<()> {
    sqlx::query(
        "UPDATE users SET email_verified = 1, verification_code = NULL WHERE id = ?",
    )
    .bind(user_id)
    .execute(pool.as_ref())
    .await?;

    Ok(())
}
