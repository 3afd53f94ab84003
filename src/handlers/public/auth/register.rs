// handlers/public/auth/register.rs - POST /api/auth/register

use serde::Deserialize;

use super::TokenResponse;
use crate::auth::{hash_password, looks_like_email, normalize_email, password::MIN_PASSWORD_LENGTH};
use crate::config;
use crate::database::{models::User, DbConn};
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidJson};
use crate::types::UserRole;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name);
        errors.require_text("email", &self.email);
        if !self.email.trim().is_empty() && !looks_like_email(&self.email) {
            errors.add("email", "Invalid email address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }
        errors.into_result()
    }
}

/// POST /api/auth/register - create a regular user account
///
/// Expected Input:
/// ```json
/// { "name": "Asha", "email": "asha@example.com", "password": "at-least-8" }
/// ```
///
/// Responds 201 with `{ token, expires_in, user }`; 409 if the email is taken.
pub async fn register_post(
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> ApiResult<TokenResponse> {
    payload.validate()?;

    let email = normalize_email(&payload.email);

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&mut conn)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("An account with this email already exists"));
    }

    let cost = config::config().security.bcrypt_cost;
    let password = payload.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Password hashing task failed: {}", e)))??;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, password_hash, role, created_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(&email)
    .bind(&password_hash)
    .bind(UserRole::User.as_str())
    .fetch_one(&mut conn)
    .await?;

    tracing::info!("Registered user {} ({})", user.id, user.email);

    Ok(ApiResponse::created(TokenResponse::issue(CurrentUser::from(user))?))
}
