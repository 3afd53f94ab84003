// handlers/protected/auth.rs - GET /api/auth/me

use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /api/auth/me - the user attached by the auth middleware
pub async fn me_get(Extension(user): Extension<CurrentUser>) -> ApiResult<CurrentUser> {
    Ok(ApiResponse::success(user))
}
