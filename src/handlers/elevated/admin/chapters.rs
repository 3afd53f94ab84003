// handlers/elevated/admin/chapters.rs - POST/PUT/DELETE /api/admin/chapters

use serde::Deserialize;
use sqlx::PgConnection;

use super::{check_position, optional_text};
use crate::database::models::Chapter;
use crate::database::DbConn;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, Deleted, ValidJson, ValidPath};

const CHAPTER_COLUMNS: &str = "id, module_id, name, description, position, created_at";

#[derive(Debug, Deserialize)]
pub struct ChapterRequest {
    pub module_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub position: Option<i32>,
}

impl ChapterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name);
        check_position(&mut errors, self.position);
        errors.into_result()
    }
}

async fn require_module(conn: &mut PgConnection, module_id: i64) -> Result<(), ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM modules WHERE id = $1")
        .bind(module_id)
        .fetch_optional(conn)
        .await?;
    match row {
        Some(_) => Ok(()),
        None => Err(ApiError::invalid_field("module_id", format!("Module {} does not exist", module_id))),
    }
}

pub async fn chapter_create(
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<ChapterRequest>,
) -> ApiResult<Chapter> {
    payload.validate()?;
    require_module(&mut conn, payload.module_id).await?;

    let sql = format!(
        "INSERT INTO chapters (module_id, name, description, position) VALUES ($1, $2, $3, $4) RETURNING {}",
        CHAPTER_COLUMNS
    );
    let chapter = sqlx::query_as::<_, Chapter>(&sql)
        .bind(payload.module_id)
        .bind(payload.name.trim())
        .bind(optional_text(payload.description.as_deref()))
        .bind(payload.position.unwrap_or(0))
        .fetch_one(&mut conn)
        .await?;

    tracing::info!("Created chapter {} in module {}", chapter.id, chapter.module_id);
    Ok(ApiResponse::created(chapter))
}

pub async fn chapter_update(
    ValidPath(chapter_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<ChapterRequest>,
) -> ApiResult<Chapter> {
    payload.validate()?;
    require_module(&mut conn, payload.module_id).await?;

    let sql = format!(
        "UPDATE chapters SET module_id = $2, name = $3, description = $4, position = $5 WHERE id = $1 RETURNING {}",
        CHAPTER_COLUMNS
    );
    sqlx::query_as::<_, Chapter>(&sql)
        .bind(chapter_id)
        .bind(payload.module_id)
        .bind(payload.name.trim())
        .bind(optional_text(payload.description.as_deref()))
        .bind(payload.position.unwrap_or(0))
        .fetch_optional(&mut conn)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("Chapter {} not found", chapter_id)))
}

pub async fn chapter_delete(ValidPath(chapter_id): ValidPath<i64>, DbConn(mut conn): DbConn) -> ApiResult<Deleted> {
    let result = sqlx::query("DELETE FROM chapters WHERE id = $1")
        .bind(chapter_id)
        .execute(&mut conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Chapter {} not found", chapter_id)));
    }
    tracing::info!("Deleted chapter {}", chapter_id);
    Ok(ApiResponse::success(Deleted::new(chapter_id)))
}
