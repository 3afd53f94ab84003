use axum::{extract::Request, middleware::Next, response::Response};

use super::validate_user::CurrentUser;
use crate::error::ApiError;

/// Rejects authenticated users whose stored role is not admin
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.is_admin() {
        tracing::warn!("User {} attempted an admin operation", user.id);
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::{from_fn, Next},
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    use crate::types::UserRole;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: 1,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role,
        }
    }

    fn admin_router(current: Option<CurrentUser>) -> Router {
        Router::new()
            .route("/admin/modules", post(|| async { "created" }))
            .route_layer(from_fn(require_admin_middleware))
            .layer(from_fn(move |mut req: Request, next: Next| {
                let current = current.clone();
                async move {
                    if let Some(user) = current {
                        req.extensions_mut().insert(user);
                    }
                    next.run(req).await
                }
            }))
    }

    async fn status_for(current: Option<CurrentUser>) -> StatusCode {
        let request = HttpRequest::post("/admin/modules").body(Body::empty()).unwrap();
        admin_router(current).oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn non_admin_gets_403() {
        assert_eq!(status_for(Some(user(UserRole::User))).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_passes_through() {
        assert_eq!(status_for(Some(user(UserRole::Admin))).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_user_gets_401() {
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
    }
}
