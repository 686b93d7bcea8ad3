use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Request body for account signup.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "ana_souza")]
    pub username: String,
    /// Unique e-mail address.
    #[schema(example = "ana@seubone.com.br")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_signup_request(payload: &SignupRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    let email = payload.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && email.len() <= 254 => {}
        _ => return Err(AppError::Validation("Email must be a valid address".into())),
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Username of the account to log into.
    #[schema(example = "ana_souza")]
    pub username: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful signup response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SignupResponse {
    /// ID of the newly created user.
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "ana_souza")]
    pub username: String,
}

impl From<crate::entity::user::Model> for SignupResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// Bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "ana_souza")]
    pub username: String,
}

/// Current authenticated user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "ana_souza")]
    pub username: String,
}
