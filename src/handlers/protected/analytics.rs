// handlers/protected/analytics.rs - performance analytics

use axum::Extension;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::database::DbConn;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

#[derive(Debug, Serialize, FromRow)]
pub struct StudyOverview {
    pub total_minutes: i64,
    pub total_questions: i64,
    pub session_count: i64,
    pub study_days: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TestOverview {
    pub tests_taken: i64,
    pub average_percentage: Option<f64>,
    pub best_percentage: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsOverview {
    pub study: StudyOverview,
    pub tests: TestOverview,
    pub average_minutes_per_study_day: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TrendPoint {
    pub test_id: i64,
    pub test_name: String,
    pub test_type: String,
    pub percentage: f64,
    pub taken_at: DateTime<Utc>,
}

/// GET /api/analytics/overview
pub async fn overview_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<AnalyticsOverview> {
    let study = sqlx::query_as::<_, StudyOverview>(
        r#"
        SELECT COALESCE(SUM(duration_minutes), 0)::BIGINT AS total_minutes,
               COALESCE(SUM(questions_attempted), 0)::BIGINT AS total_questions,
               COUNT(*) AS session_count,
               COUNT(DISTINCT study_date) AS study_days
        FROM study_sessions
        WHERE user_id = $1
        "#,
    )
    .bind(user.id)
    .fetch_one(&mut conn)
    .await?;

    let tests = sqlx::query_as::<_, TestOverview>(
        r#"
        SELECT COUNT(*) AS tests_taken,
               AVG(percentage) AS average_percentage,
               MAX(percentage) AS best_percentage
        FROM test_results
        WHERE user_id = $1
        "#,
    )
    .bind(user.id)
    .fetch_one(&mut conn)
    .await?;

    let average_minutes_per_study_day = if study.study_days == 0 {
        0.0
    } else {
        study.total_minutes as f64 / study.study_days as f64
    };

    Ok(ApiResponse::success(AnalyticsOverview {
        study,
        tests,
        average_minutes_per_study_day,
    }))
}

/// GET /api/analytics/performance-trend - oldest first
pub async fn performance_trend_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Vec<TrendPoint>> {
    let points = sqlx::query_as::<_, TrendPoint>(
        r#"
        SELECT id AS test_id, test_name, test_type, percentage, taken_at
        FROM test_results
        WHERE user_id = $1
        ORDER BY taken_at ASC, id ASC
        "#,
    )
    .bind(user.id)
    .fetch_all(&mut conn)
    .await?;

    Ok(ApiResponse::success(points))
}

// TODO: derive weak areas from per-section accuracy once test_results records
// per-question topic tags; until then this is a placeholder.
/// GET /api/analytics/weak-areas - temporary placeholder
pub async fn weak_areas_get(Extension(_user): Extension<CurrentUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "areas": [],
        "placeholder": true
    })))
}

/// GET /api/analytics/time-distribution - temporary placeholder
pub async fn time_distribution_get(Extension(_user): Extension<CurrentUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "by_section": {
            "VARC": 0,
            "DILR": 0,
            "QA": 0
        },
        "total_minutes": 0,
        "placeholder": true
    })))
}
