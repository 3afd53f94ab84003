// handlers/elevated/admin/materials.rs - POST/PUT/DELETE /api/admin/materials

use serde::Deserialize;
use sqlx::PgConnection;

use super::optional_text;
use crate::database::models::StudyMaterial;
use crate::database::DbConn;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, Deleted, ValidJson, ValidPath};

const MATERIAL_COLUMNS: &str = "id, chapter_id, title, summary, created_at";

#[derive(Debug, Deserialize)]
pub struct MaterialRequest {
    pub chapter_id: i64,
    pub title: String,
    pub summary: Option<String>,
}

impl MaterialRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_text("title", &self.title);
        errors.into_result()
    }
}

async fn require_chapter(conn: &mut PgConnection, chapter_id: i64) -> Result<(), ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM chapters WHERE id = $1")
        .bind(chapter_id)
        .fetch_optional(conn)
        .await?;
    row.map(|_| ())
        .ok_or_else(|| ApiError::invalid_field("chapter_id", format!("Chapter {} does not exist", chapter_id)))
}

pub async fn material_create(
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<MaterialRequest>,
) -> ApiResult<StudyMaterial> {
    payload.validate()?;
    require_chapter(&mut conn, payload.chapter_id).await?;

    let sql = format!(
        "INSERT INTO study_materials (chapter_id, title, summary) VALUES ($1, $2, $3) RETURNING {}",
        MATERIAL_COLUMNS
    );
    let material = sqlx::query_as::<_, StudyMaterial>(&sql)
        .bind(payload.chapter_id)
        .bind(payload.title.trim())
        .bind(optional_text(payload.summary.as_deref()))
        .fetch_one(&mut conn)
        .await?;

    tracing::info!("Created study material {} in chapter {}", material.id, material.chapter_id);
    Ok(ApiResponse::created(material))
}

pub async fn material_update(
    ValidPath(material_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<MaterialRequest>,
) -> ApiResult<StudyMaterial> {
    payload.validate()?;
    require_chapter(&mut conn, payload.chapter_id).await?;

    let sql = format!(
        "UPDATE study_materials SET chapter_id = $2, title = $3, summary = $4 WHERE id = $1 RETURNING {}",
        MATERIAL_COLUMNS
    );
    sqlx::query_as::<_, StudyMaterial>(&sql)
        .bind(material_id)
        .bind(payload.chapter_id)
        .bind(payload.title.trim())
        .bind(optional_text(payload.summary.as_deref()))
        .fetch_optional(&mut conn)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("Study material {} not found", material_id)))
}

pub async fn material_delete(ValidPath(material_id): ValidPath<i64>, DbConn(mut conn): DbConn) -> ApiResult<Deleted> {
    let result = sqlx::query("DELETE FROM study_materials WHERE id = $1")
        .bind(material_id)
        .execute(&mut conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Study material {} not found", material_id)));
    }
    tracing::info!("Deleted study material {}", material_id);
    Ok(ApiResponse::success(Deleted::new(material_id)))
}
