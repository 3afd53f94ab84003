// handlers/protected/streak.rs - GET /api/streak, POST /api/streak/check-in

use axum::Extension;
use sqlx::Connection;

use crate::database::DbConn;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::streak::{self, load_streak, PgStreakStore, StreakState, StreakUpdate};

/// GET /api/streak - read only; a user who never studied gets zeros
pub async fn streak_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<StreakState> {
    Ok(ApiResponse::success(load_streak(&mut conn, user.id).await?))
}

/// POST /api/streak/check-in - count today as a study day
pub async fn check_in_post(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<StreakUpdate> {
    let mut tx = conn.begin().await?;
    let update = streak::record_study_day(&mut PgStreakStore::new(&mut tx), user.id, streak::today()).await?;
    tx.commit().await?;

    Ok(ApiResponse::success(update))
}
