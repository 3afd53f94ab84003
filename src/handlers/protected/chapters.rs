// handlers/protected/chapters.rs - chapters, completion and skip tests

use axum::Extension;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use super::modules::{fetch_module, module_chapters};
use crate::config;
use crate::database::models::ChapterWithProgress;
use crate::database::DbConn;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidJson, ValidPath};
use crate::services::{evaluate_skip_test, SkipTestOutcome};
use crate::types::CompletionMethod;

/// Chapter columns plus the progress of the user bound as $1
pub(crate) const CHAPTER_WITH_PROGRESS: &str = r#"
    SELECT c.id, c.module_id, m.name AS module_name, c.name, c.description, c.position,
           (cp.chapter_id IS NOT NULL) AS completed, cp.completed_via, cp.completed_at
    FROM chapters c
    JOIN modules m ON m.id = c.module_id
    LEFT JOIN chapter_progress cp ON cp.chapter_id = c.id AND cp.user_id = $1
"#;

pub(crate) async fn fetch_chapter(
    conn: &mut PgConnection,
    chapter_id: i64,
    user_id: i64,
) -> Result<ChapterWithProgress, ApiError> {
    let sql = format!("{} WHERE c.id = $2", CHAPTER_WITH_PROGRESS);
    sqlx::query_as::<_, ChapterWithProgress>(&sql)
        .bind(user_id)
        .bind(chapter_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Chapter {} not found", chapter_id)))
}

pub(crate) async fn chapter_exists(conn: &mut PgConnection, chapter_id: i64) -> Result<bool, ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM chapters WHERE id = $1")
        .bind(chapter_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

async fn mark_complete(
    conn: &mut PgConnection,
    user_id: i64,
    chapter_id: i64,
    method: CompletionMethod,
    skip_test_score: Option<f64>,
) -> Result<(), ApiError> {
    // First completion wins; later completions of the same chapter are no-ops
    sqlx::query(
        r#"
        INSERT INTO chapter_progress (user_id, chapter_id, completed_via, skip_test_score)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, chapter_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(chapter_id)
    .bind(method.as_str())
    .bind(skip_test_score)
    .execute(conn)
    .await?;
    Ok(())
}

/// GET /api/modules/:id/chapters
pub async fn module_chapters_get(
    Extension(user): Extension<CurrentUser>,
    ValidPath(module_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Vec<ChapterWithProgress>> {
    fetch_module(&mut conn, module_id).await?;
    Ok(ApiResponse::success(module_chapters(&mut conn, module_id, user.id).await?))
}

/// GET /api/chapters/:id
pub async fn chapter_get(
    Extension(user): Extension<CurrentUser>,
    ValidPath(chapter_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<ChapterWithProgress> {
    Ok(ApiResponse::success(fetch_chapter(&mut conn, chapter_id, user.id).await?))
}

/// POST /api/chapters/:id/complete - idempotent
pub async fn complete_post(
    Extension(user): Extension<CurrentUser>,
    ValidPath(chapter_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<ChapterWithProgress> {
    if !chapter_exists(&mut conn, chapter_id).await? {
        return Err(ApiError::not_found(format!("Chapter {} not found", chapter_id)));
    }

    mark_complete(&mut conn, user.id, chapter_id, CompletionMethod::Study, None).await?;
    Ok(ApiResponse::success(fetch_chapter(&mut conn, chapter_id, user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SkipTestRequest {
    pub correct: i32,
    pub total: i32,
}

impl SkipTestRequest {
    fn validate(&self) -> Result<(u32, u32), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_non_negative("correct", self.correct);
        if self.total <= 0 {
            errors.add("total", "Must be greater than zero");
        }
        if self.correct > self.total {
            errors.add("correct", "Cannot exceed total");
        }
        errors.into_result()?;
        Ok((self.correct.unsigned_abs(), self.total.unsigned_abs()))
    }
}

#[derive(Debug, Serialize)]
pub struct SkipTestResponse {
    #[serde(flatten)]
    pub outcome: SkipTestOutcome,
    pub chapter: ChapterWithProgress,
}

/// POST /api/chapters/:id/skip-test - a passing score marks the chapter complete
pub async fn skip_test_post(
    Extension(user): Extension<CurrentUser>,
    ValidPath(chapter_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<SkipTestRequest>,
) -> ApiResult<SkipTestResponse> {
    let (correct, total) = payload.validate()?;

    if !chapter_exists(&mut conn, chapter_id).await? {
        return Err(ApiError::not_found(format!("Chapter {} not found", chapter_id)));
    }

    let required = config::config().study.skip_test_pass_percentage;
    let outcome = evaluate_skip_test(correct, total, required);

    if outcome.passed {
        mark_complete(
            &mut conn,
            user.id,
            chapter_id,
            CompletionMethod::SkipTest,
            Some(outcome.percentage),
        )
        .await?;
        tracing::info!("User {} skipped chapter {} with {:.2}%", user.id, chapter_id, outcome.percentage);
    }

    let chapter = fetch_chapter(&mut conn, chapter_id, user.id).await?;
    Ok(ApiResponse::success(SkipTestResponse { outcome, chapter }))
}
