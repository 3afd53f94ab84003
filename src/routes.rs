use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::handlers::{elevated::admin, protected, public, system};
use crate::middleware::{
    jwt_auth_middleware, method_not_allowed_middleware, not_found_fallback, require_admin_middleware,
    validate_user_middleware,
};

/// Full application router
pub fn app() -> Router {
    let cfg = config::config();

    let mut router = Router::new()
        // Public
        .route("/", get(system::root_get))
        .route("/health", get(system::health_get))
        .merge(public_routes())
        // Protected API
        .merge(protected_routes())
        // Admin API
        .merge(admin_routes())
        .fallback(not_found_fallback)
        // Global middleware
        .layer(from_fn(method_not_allowed_middleware))
        .layer(DefaultBodyLimit::max(cfg.server.max_request_size_bytes))
        .layer(cors_layer());

    if cfg.server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer() -> CorsLayer {
    if crate::is_development!() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

fn public_routes() -> Router {
    Router::new()
        // Token acquisition
        .route("/api/auth/register", post(public::auth::register_post))
        .route("/api/auth/login", post(public::auth::login_post))
        // Score preview
        .route("/api/marking/calculate", post(public::marking::calculate_post))
}

/// Routes that need a valid token and an existing user.
/// route_layer: the last layer added runs first.
fn protected_routes() -> Router {
    use protected::*;

    Router::new()
        .route("/api/auth/me", get(auth::me_get))
        // Syllabus
        .route("/api/modules", get(modules::modules_get))
        .route("/api/modules/:id", get(modules::module_get))
        .route("/api/modules/:id/chapters", get(chapters::module_chapters_get))
        .route("/api/chapters/:id", get(chapters::chapter_get))
        .route("/api/chapters/:id/complete", post(chapters::complete_post))
        .route("/api/chapters/:id/skip-test", post(chapters::skip_test_post))
        .route("/api/chapters/:id/materials", get(materials::chapter_materials_get))
        .route("/api/materials/:id", get(materials::material_get))
        // Tracking
        .route("/api/dashboard", get(dashboard::dashboard_get))
        .route("/api/streak", get(streak::streak_get))
        .route("/api/streak/check-in", post(streak::check_in_post))
        .route("/api/settings", get(settings::settings_get).put(settings::settings_put))
        .route(
            "/api/study-sessions",
            get(study_sessions::sessions_get).post(study_sessions::sessions_post),
        )
        .route("/api/tests", get(test_results::tests_get).post(test_results::tests_post))
        .route("/api/tests/:id", get(test_results::test_get).delete(test_results::test_delete))
        // Analytics
        .route("/api/analytics/overview", get(analytics::overview_get))
        .route("/api/analytics/performance-trend", get(analytics::performance_trend_get))
        .route("/api/analytics/weak-areas", get(analytics::weak_areas_get))
        .route("/api/analytics/time-distribution", get(analytics::time_distribution_get))
        // Social
        .route("/api/users/search", get(users::search_get))
        .route("/api/friends", get(friends::friends_get))
        .route("/api/friends/:id", delete(friends::friend_delete))
        .route("/api/friends/requests", get(friends::requests_get).post(friends::request_post))
        .route("/api/friends/requests/:id/accept", post(friends::request_accept_post))
        .route("/api/friends/requests/:id/reject", post(friends::request_reject_post))
        .route("/api/leaderboard", get(leaderboard::leaderboard_get))
        .route_layer(from_fn(validate_user_middleware))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn admin_routes() -> Router {
    Router::new()
        .route("/api/admin/modules", post(admin::module_create))
        .route("/api/admin/modules/:id", put(admin::module_update).delete(admin::module_delete))
        .route("/api/admin/chapters", post(admin::chapter_create))
        .route("/api/admin/chapters/:id", put(admin::chapter_update).delete(admin::chapter_delete))
        .route("/api/admin/materials", post(admin::material_create))
        .route(
            "/api/admin/materials/:id",
            put(admin::material_update).delete(admin::material_delete),
        )
        .route("/api/admin/materials/:id/:kind", post(admin::item_create))
        .route("/api/admin/materials/:id/:kind/:item_id", delete(admin::item_delete))
        .route_layer(from_fn(require_admin_middleware))
        .route_layer(from_fn(validate_user_middleware))
        .route_layer(from_fn(jwt_auth_middleware))
}
