use axum::{extract::Request, middleware::Next, response::Response};
use serde::Serialize;

use super::auth::AuthUser;
use crate::database::{models::User, DatabaseManager};
use crate::error::ApiError;
use crate::types::UserRole;

/// The authenticated user as stored in the database, attached to every protected request
#[derive(Clone, Debug, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        let role = user.role();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
        }
    }
}

/// Loads the user named by the verified token. The role is taken from the
/// database row, never from the token.
pub async fn validate_user_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let mut conn = DatabaseManager::connect().await?;
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = $1",
    )
    .bind(auth_user.user_id)
    .fetch_optional(&mut conn)
    .await?;
    drop(conn);

    let user = user.ok_or_else(|| {
        tracing::warn!("User validation failed: user {} not found", auth_user.user_id);
        ApiError::unauthorized("User not found")
    })?;

    if user.role() != auth_user.role {
        tracing::debug!(
            "Role in token ({:?}) differs from stored role ({}) for user {}",
            auth_user.role,
            user.role,
            user.id
        );
    }

    request.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        User {
            id: 4,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            role: role.to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn admin_flag_comes_from_stored_role() {
        assert!(CurrentUser::from(user("admin")).is_admin());
        assert!(!CurrentUser::from(user("user")).is_admin());
        // Unknown roles get no privileges
        assert!(!CurrentUser::from(user("superuser")).is_admin());
    }

    #[test]
    fn current_user_never_serializes_password_hash() {
        let value = serde_json::to_value(CurrentUser::from(user("user"))).unwrap();
        assert_eq!(value["role"], "user");
        assert!(value.get("password_hash").is_none());
    }
}
