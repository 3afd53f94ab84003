pub mod auth;
pub mod extract;
pub mod require_admin;
pub mod response;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use extract::{ValidJson, ValidPath, ValidQuery};
pub use require_admin::require_admin_middleware;
pub use response::{method_not_allowed_middleware, not_found_fallback, ApiResponse, ApiResult, Deleted};
pub use validate_user::{validate_user_middleware, CurrentUser};
