use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub profile_pic_url: Option<String>,
    pub role: String,
    pub email_verified: i64,
    pub verification_code: Option<String>,
    pub blocked: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Public projection of a user, safe to embed in conversation and
/// message payloads seen by the other participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub profile_pic_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            profile_pic_url: user.profile_pic_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub profile_pic_url: Option<String>,
    pub role: String,
    pub email_verified: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            profile_pic_url: user.profile_pic_url,
            role: user.role,
            email_verified: user.email_verified == 1,
            created_at: user.created_at,
        }
    }
}

impl User {
    pub fn new(
        email: String,
        name: String,
        password_hash: String,
        verification_code: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            name,
            profile_pic_url: None,
            role: Role::User.as_str().to_string(),
            email_verified: 0,
            verification_code: Some(verification_code),
            blocked: 0,
            created_at: Utc::now().to_rfc3339(),
            updated_at: None,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.email_verified == 1
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked == 1
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}
