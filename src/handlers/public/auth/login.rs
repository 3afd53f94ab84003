// handlers/public/auth/login.rs - POST /api/auth/login

use serde::Deserialize;

use super::TokenResponse;
use crate::auth::{normalize_email, verify_password};
use crate::database::{models::User, DbConn};
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidJson};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login - Authenticate user and receive JWT token
///
/// Expected Input:
/// ```json
/// { "email": "asha@example.com", "password": "secret-password" }
/// ```
///
/// Unknown email and wrong password produce the same 401 so the endpoint
/// does not reveal which accounts exist.
pub async fn login_post(
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let mut errors = FieldErrors::new();
    errors.require_text("email", &payload.email);
    errors.require_text("password", &payload.password);
    errors.into_result()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = $1",
    )
    .bind(normalize_email(&payload.email))
    .fetch_optional(&mut conn)
    .await?;
    drop(conn);

    let invalid = || ApiError::unauthorized("Invalid email or password");
    let user = user.ok_or_else(invalid)?;

    let password = payload.password;
    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Password verification task failed: {}", e)))?;

    if !verified {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(invalid());
    }

    tracing::info!("User {} logged in", user.id);
    Ok(ApiResponse::success(TokenResponse::issue(CurrentUser::from(user))?))
}
