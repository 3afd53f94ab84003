// handlers/public/auth/mod.rs - Token acquisition endpoints (no authentication required)

use serde::Serialize;

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::middleware::CurrentUser;

pub mod login; // POST /api/auth/login - verify credentials and issue JWT
pub mod register; // POST /api/auth/register - create account and issue JWT

pub use login::login_post;
pub use register::register_post;

/// Response body shared by login and register
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: CurrentUser,
}

impl TokenResponse {
    pub fn issue(user: CurrentUser) -> Result<Self, ApiError> {
        let claims = Claims::new(user.id, user.role);
        let token = generate_jwt(&claims)?;
        Ok(Self {
            token,
            expires_in: claims.expires_in(),
            user,
        })
    }
}
