// handlers/protected/modules.rs - syllabus modules

use axum::Extension;
use serde::Serialize;
use sqlx::PgConnection;

use super::chapters::CHAPTER_WITH_PROGRESS;
use crate::database::models::{ChapterWithProgress, Module, ModuleOverview};
use crate::database::DbConn;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidPath};

#[derive(Debug, Serialize)]
pub struct ModuleDetail {
    #[serde(flatten)]
    pub module: Module,
    pub chapters: Vec<ChapterWithProgress>,
}

pub(crate) async fn fetch_module(conn: &mut PgConnection, module_id: i64) -> Result<Module, ApiError> {
    sqlx::query_as::<_, Module>(
        "SELECT id, name, description, section, position, created_at FROM modules WHERE id = $1",
    )
    .bind(module_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Module {} not found", module_id)))
}

pub(crate) async fn module_chapters(
    conn: &mut PgConnection,
    module_id: i64,
    user_id: i64,
) -> Result<Vec<ChapterWithProgress>, ApiError> {
    let sql = format!("{} WHERE c.module_id = $2 ORDER BY c.position, c.id", CHAPTER_WITH_PROGRESS);
    let chapters = sqlx::query_as::<_, ChapterWithProgress>(&sql)
        .bind(user_id)
        .bind(module_id)
        .fetch_all(conn)
        .await?;
    Ok(chapters)
}

/// GET /api/modules - every module with chapter totals and the caller's progress
pub async fn modules_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Vec<ModuleOverview>> {
    let modules = sqlx::query_as::<_, ModuleOverview>(
        r#"
        SELECT m.id, m.name, m.description, m.section, m.position,
               COUNT(c.id) AS chapter_count,
               COUNT(cp.chapter_id) AS completed_chapters
        FROM modules m
        LEFT JOIN chapters c ON c.module_id = m.id
        LEFT JOIN chapter_progress cp ON cp.chapter_id = c.id AND cp.user_id = $1
        GROUP BY m.id
        ORDER BY m.position, m.id
        "#,
    )
    .bind(user.id)
    .fetch_all(&mut conn)
    .await?;

    Ok(ApiResponse::success(modules))
}

/// GET /api/modules/:id - module with its chapters
pub async fn module_get(
    Extension(user): Extension<CurrentUser>,
    ValidPath(module_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<ModuleDetail> {
    let module = fetch_module(&mut conn, module_id).await?;
    let chapters = module_chapters(&mut conn, module_id, user.id).await?;

    Ok(ApiResponse::success(ModuleDetail { module, chapters }))
}
