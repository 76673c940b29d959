use crate::utils::error::{AppError, AppResult};

pub const MAX_MESSAGE_LEN: usize = 2000;
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Message content must be validated after trimming; the stored content is
/// the trimmed form.
pub fn validate_message_content(content: &str) -> AppResult<()> {
    if content.is_empty() {
        return Err(AppError::Validation(
            "Message content cannot be empty".to_string(),
        ));
    }

    if content.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::Validation(
            "Message cannot exceed 2000 characters".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.is_empty() {
        return Err(AppError::Validation("Email cannot be empty".to_string()));
    }

    if email.len() > 254 || !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    Ok(())
}

pub fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
    }

    if name.len() > 64 {
        return Err(AppError::Validation(
            "Name must be at most 64 characters long".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_listing_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation(
            "Listing title cannot be empty".to_string(),
        ));
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(
            "Listing title must be at most 100 characters long".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_listing_price(price_cents: i64) -> AppResult<()> {
    if price_cents < 0 {
        return Err(AppError::Validation(
            "Price cannot be negative".to_string(),
        ));
    }

    Ok(())
}
