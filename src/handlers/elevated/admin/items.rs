// handlers/elevated/admin/items.rs - content items attached to a study material
//
// POST   /api/admin/materials/:id/:kind
// DELETE /api/admin/materials/:id/:kind/:item_id
//
// `kind` is one of pointers, formulas, examples, practice-problems. The body
// is read as raw JSON first and then decoded into the shape for that kind.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgConnection;

use super::{check_position, optional_text};
use crate::database::models::{Example, Formula, Pointer, PracticeProblem};
use crate::database::DbConn;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, Deleted, ValidJson, ValidPath};
use crate::types::ContentKind;

#[derive(Debug, Deserialize)]
pub struct PointerInput {
    pub content: String,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct FormulaInput {
    pub name: String,
    pub expression: String,
    pub explanation: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ExampleInput {
    pub question: String,
    pub solution: String,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct PracticeProblemInput {
    pub question: String,
    pub answer: String,
    pub solution: Option<String>,
    pub difficulty: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ContentItem {
    Pointer(Pointer),
    Formula(Formula),
    Example(Example),
    PracticeProblem(PracticeProblem),
}

trait ItemInput: DeserializeOwned {
    fn check(&self, errors: &mut FieldErrors);
}

impl ItemInput for PointerInput {
    fn check(&self, errors: &mut FieldErrors) {
        errors.require_text("content", &self.content);
        check_position(errors, self.position);
    }
}

impl ItemInput for FormulaInput {
    fn check(&self, errors: &mut FieldErrors) {
        errors.require_text("name", &self.name);
        errors.require_text("expression", &self.expression);
        check_position(errors, self.position);
    }
}

impl ItemInput for ExampleInput {
    fn check(&self, errors: &mut FieldErrors) {
        errors.require_text("question", &self.question);
        errors.require_text("solution", &self.solution);
        check_position(errors, self.position);
    }
}

impl ItemInput for PracticeProblemInput {
    fn check(&self, errors: &mut FieldErrors) {
        errors.require_text("question", &self.question);
        errors.require_text("answer", &self.answer);
        check_position(errors, self.position);
    }
}

/// Decode the raw body into the input shape for one kind and validate it
fn decode<T: ItemInput>(kind: ContentKind, body: Value) -> Result<T, ApiError> {
    let input: T = serde_json::from_value(body)
        .map_err(|e| ApiError::invalid_json(format!("Invalid {} body: {}", kind.table(), e)))?;
    let mut errors = FieldErrors::new();
    input.check(&mut errors);
    errors.into_result()?;
    Ok(input)
}

async fn insert_item(
    conn: &mut PgConnection,
    material_id: i64,
    kind: ContentKind,
    body: Value,
) -> Result<ContentItem, ApiError> {
    let item = match kind {
        ContentKind::Pointer => {
            let input: PointerInput = decode(kind, body)?;
            ContentItem::Pointer(
                sqlx::query_as::<_, Pointer>(
                    "INSERT INTO pointers (material_id, content, position) VALUES ($1, $2, $3) \
                     RETURNING id, material_id, content, position",
                )
                .bind(material_id)
                .bind(input.content.trim())
                .bind(input.position.unwrap_or(0))
                .fetch_one(conn)
                .await?,
            )
        }
        ContentKind::Formula => {
            let input: FormulaInput = decode(kind, body)?;
            ContentItem::Formula(
                sqlx::query_as::<_, Formula>(
                    "INSERT INTO formulas (material_id, name, expression, explanation, position) \
                     VALUES ($1, $2, $3, $4, $5) \
                     RETURNING id, material_id, name, expression, explanation, position",
                )
                .bind(material_id)
                .bind(input.name.trim())
                .bind(input.expression.trim())
                .bind(optional_text(input.explanation.as_deref()))
                .bind(input.position.unwrap_or(0))
                .fetch_one(conn)
                .await?,
            )
        }
        ContentKind::Example => {
            let input: ExampleInput = decode(kind, body)?;
            ContentItem::Example(
                sqlx::query_as::<_, Example>(
                    "INSERT INTO examples (material_id, question, solution, position) VALUES ($1, $2, $3, $4) \
                     RETURNING id, material_id, question, solution, position",
                )
                .bind(material_id)
                .bind(input.question.trim())
                .bind(input.solution.trim())
                .bind(input.position.unwrap_or(0))
                .fetch_one(conn)
                .await?,
            )
        }
        ContentKind::PracticeProblem => {
            let input: PracticeProblemInput = decode(kind, body)?;
            ContentItem::PracticeProblem(
                sqlx::query_as::<_, PracticeProblem>(
                    "INSERT INTO practice_problems (material_id, question, answer, solution, difficulty, position) \
                     VALUES ($1, $2, $3, $4, $5, $6) \
                     RETURNING id, material_id, question, answer, solution, difficulty, position",
                )
                .bind(material_id)
                .bind(input.question.trim())
                .bind(input.answer.trim())
                .bind(optional_text(input.solution.as_deref()))
                .bind(optional_text(input.difficulty.as_deref()))
                .bind(input.position.unwrap_or(0))
                .fetch_one(conn)
                .await?,
            )
        }
    };
    Ok(item)
}

/// A missing material in the path is a 404
async fn require_material(conn: &mut PgConnection, material_id: i64) -> Result<(), ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM study_materials WHERE id = $1")
        .bind(material_id)
        .fetch_optional(conn)
        .await?;
    row.map(|_| ())
        .ok_or_else(|| ApiError::not_found(format!("Study material {} not found", material_id)))
}

pub async fn item_create(
    ValidPath((material_id, kind)): ValidPath<(i64, ContentKind)>,
    DbConn(mut conn): DbConn,
    ValidJson(body): ValidJson<Value>,
) -> ApiResult<ContentItem> {
    require_material(&mut conn, material_id).await?;
    let item = insert_item(&mut conn, material_id, kind, body).await?;

    tracing::info!("Added {} item to study material {}", kind.table(), material_id);
    Ok(ApiResponse::created(item))
}

pub async fn item_delete(
    ValidPath((material_id, kind, item_id)): ValidPath<(i64, ContentKind, i64)>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Deleted> {
    // table() only ever yields one of four fixed identifiers
    let sql = format!("DELETE FROM {} WHERE id = $1 AND material_id = $2", kind.table());
    let result = sqlx::query(&sql)
        .bind(item_id)
        .bind(material_id)
        .execute(&mut conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!(
            "No {} item {} on study material {}",
            kind.table(),
            item_id,
            material_id
        )));
    }
    Ok(ApiResponse::success(Deleted::new(item_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_body_for_its_kind() {
        let input: FormulaInput = decode(
            ContentKind::Formula,
            json!({"name": "Simple interest", "expression": "P * R * T / 100"}),
        )
        .unwrap();
        assert_eq!(input.name, "Simple interest");
        assert!(input.explanation.is_none());
    }

    #[test]
    fn wrong_shape_is_invalid_json() {
        let err = decode::<PointerInput>(ContentKind::Pointer, json!({"question": "?"})).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_JSON");
    }

    #[test]
    fn blank_required_fields_fail_validation() {
        let err = decode::<PracticeProblemInput>(
            ContentKind::PracticeProblem,
            json!({"question": "2 + 2?", "answer": "  ", "position": -3}),
        )
        .unwrap_err();
        let body = err.to_json();
        assert_eq!(body["field_errors"]["answer"], "This field is required");
        assert_eq!(body["field_errors"]["position"], "Must not be negative");
    }
}
