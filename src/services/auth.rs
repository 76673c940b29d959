use serde::{Deserialize, Serialize};

use crate::database::DbPool;
use crate::models::user::{User, UserResponse};
use crate::store;
use crate::utils::crypto::{generate_verification_code, hash_password, verify_password};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt::JwtService;
use crate::utils::validation::{validate_email, validate_name, validate_password};

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

pub async fn register_user(
    pool: &DbPool,
    request: RegisterRequest,
    jwt_service: &JwtService,
) -> AppResult<RegisterResponse> {
    validate_name(&request.name)?;
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    if store::user::find_by_email(pool, &request.email).await?.is_some() {
        return Err(AppError::BadRequest(
            "Email is already registered".to_string(),
        ));
    }

    let password_hash = hash_password(&request.password)?;
    let verification_code = generate_verification_code();

    let user = User::new(
        request.email.trim().to_lowercase(),
        request.name.trim().to_string(),
        password_hash,
        verification_code.clone(),
    );

    store::user::insert(pool, &user).await?;

    // Delivery goes through the external mail collaborator; logged here so
    // local setups can complete verification without it.
    tracing::info!(
        "Verification code for {}: {}",
        user.email,
        verification_code
    );

    let token = jwt_service.generate_token(&user.id)?;

    Ok(RegisterResponse {
        user: UserResponse::from(user),
        token,
    })
}

pub async fn login_user(
    pool: &DbPool,
    request: LoginRequest,
    jwt_service: &JwtService,
) -> AppResult<LoginResponse> {
    let user = store::user::find_by_email(pool, &request.email)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

    if user.is_blocked() {
        return Err(AppError::Auth("Account is blocked".to_string()));
    }

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let token = jwt_service.generate_token(&user.id)?;

    Ok(LoginResponse {
        user: UserResponse::from(user),
        token,
    })
}

pub async fn verify_email(pool: &DbPool, email: &str, code: &str) -> AppResult<()> {
    let user = store::user::find_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if user.is_verified() {
        return Ok(());
    }

    match &user.verification_code {
        Some(expected) if expected == code => {
            store::user::mark_verified(pool, &user.id).await?;
            tracing::info!("Email verified for user {}", user.id);
            Ok(())
        }
        _ => Err(AppError::BadRequest(
            "Invalid verification code".to_string(),
        )),
    }
}
