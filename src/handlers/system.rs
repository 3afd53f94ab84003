// handlers/system.rs - service info and health probes

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::config;
use crate::database::DatabaseManager;

/// GET / - service description and route overview
pub async fn root_get() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "CAT Prep API",
            "version": version,
            "environment": format!("{:?}", config::config().environment),
            "description": "Study tracking backend for CAT exam preparation",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/api/auth/register, /api/auth/login (public - token acquisition)",
                "marking": "/api/marking/calculate (public)",
                "auth": "/api/auth/me (protected)",
                "syllabus": "/api/modules[/:id[/chapters]], /api/chapters/:id[/complete|/skip-test|/materials], /api/materials/:id (protected)",
                "tracking": "/api/dashboard, /api/streak[/check-in], /api/settings, /api/study-sessions, /api/tests[/:id] (protected)",
                "analytics": "/api/analytics/{overview,performance-trend,weak-areas,time-distribution} (protected)",
                "social": "/api/users/search, /api/friends[/requests], /api/leaderboard (protected)",
                "admin": "/api/admin/{modules,chapters,materials}[/:id] (restricted, admin role)",
            }
        }
    }))
}

/// GET /health - 200 when the database answers, 503 otherwise
pub async fn health_get() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            let detail = if config::config().security.expose_internal_errors {
                Some(e.to_string())
            } else {
                None
            };
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": detail
                    }
                })),
            )
        }
    }
}
