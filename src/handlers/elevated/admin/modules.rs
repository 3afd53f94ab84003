// handlers/elevated/admin/modules.rs - POST/PUT/DELETE /api/admin/modules

use serde::Deserialize;

use super::{check_position, optional_text};
use crate::database::models::Module;
use crate::database::DbConn;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, Deleted, ValidJson, ValidPath};

const MODULE_COLUMNS: &str = "id, name, description, section, position, created_at";

/// Expected Input:
/// ```json
/// { "name": "Arithmetic", "section": "QA", "description": "...", "position": 1 }
/// ```
#[derive(Debug, Deserialize)]
pub struct ModuleRequest {
    pub name: String,
    pub description: Option<String>,
    pub section: Option<String>,
    pub position: Option<i32>,
}

impl ModuleRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name);
        check_position(&mut errors, self.position);
        errors.into_result()
    }
}

pub async fn module_create(
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<ModuleRequest>,
) -> ApiResult<Module> {
    payload.validate()?;

    let sql = format!(
        "INSERT INTO modules (name, description, section, position) VALUES ($1, $2, $3, $4) RETURNING {}",
        MODULE_COLUMNS
    );
    let module = sqlx::query_as::<_, Module>(&sql)
        .bind(payload.name.trim())
        .bind(optional_text(payload.description.as_deref()))
        .bind(optional_text(payload.section.as_deref()))
        .bind(payload.position.unwrap_or(0))
        .fetch_one(&mut conn)
        .await?;

    tracing::info!("Created module {} ({})", module.id, module.name);
    Ok(ApiResponse::created(module))
}

/// PUT replaces every field; an omitted position resets to 0
pub async fn module_update(
    ValidPath(module_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<ModuleRequest>,
) -> ApiResult<Module> {
    payload.validate()?;

    let sql = format!(
        "UPDATE modules SET name = $2, description = $3, section = $4, position = $5 WHERE id = $1 RETURNING {}",
        MODULE_COLUMNS
    );
    sqlx::query_as::<_, Module>(&sql)
        .bind(module_id)
        .bind(payload.name.trim())
        .bind(optional_text(payload.description.as_deref()))
        .bind(optional_text(payload.section.as_deref()))
        .bind(payload.position.unwrap_or(0))
        .fetch_optional(&mut conn)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("Module {} not found", module_id)))
}

/// Chapters, materials and progress rows go with it (ON DELETE CASCADE)
pub async fn module_delete(ValidPath(module_id): ValidPath<i64>, DbConn(mut conn): DbConn) -> ApiResult<Deleted> {
    let result = sqlx::query("DELETE FROM modules WHERE id = $1")
        .bind(module_id)
        .execute(&mut conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Module {} not found", module_id)));
    }
    tracing::info!("Deleted module {}", module_id);
    Ok(ApiResponse::success(Deleted::new(module_id)))
}
