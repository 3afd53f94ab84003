// handlers/protected/materials.rs - study material reading

use std::collections::HashMap;

use axum::Extension;
use sqlx::{FromRow, PgConnection, Postgres};

use super::chapters::chapter_exists;
use crate::database::models::{Example, Formula, MaterialContent, Pointer, PracticeProblem, StudyMaterial};
use crate::database::DbConn;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidPath};

async fn fetch_material(conn: &mut PgConnection, material_id: i64) -> Result<StudyMaterial, ApiError> {
    sqlx::query_as::<_, StudyMaterial>(
        "SELECT id, chapter_id, title, summary, created_at FROM study_materials WHERE id = $1",
    )
    .bind(material_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Study material {} not found", material_id)))
}

/// Load every item of one content table for the given materials, grouped by material id
async fn load_items<T>(
    conn: &mut PgConnection,
    sql: &str,
    material_ids: &[i64],
) -> Result<HashMap<i64, Vec<T>>, ApiError>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin + HasMaterial,
{
    let rows = sqlx::query_as::<Postgres, T>(sql)
        .bind(material_ids)
        .fetch_all(conn)
        .await?;

    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(row.material_id()).or_default().push(row);
    }
    Ok(grouped)
}

pub(crate) trait HasMaterial {
    fn material_id(&self) -> i64;
}

macro_rules! has_material {
    ($($ty:ty),*) => {
        $(impl HasMaterial for $ty {
            fn material_id(&self) -> i64 {
                self.material_id
            }
        })*
    };
}

has_material!(Pointer, Formula, Example, PracticeProblem);

/// Attach pointers, formulas, examples and practice problems to each material
pub(crate) async fn load_contents(
    conn: &mut PgConnection,
    materials: Vec<StudyMaterial>,
) -> Result<Vec<MaterialContent>, ApiError> {
    if materials.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = materials.iter().map(|m| m.id).collect();

    let mut pointers = load_items::<Pointer>(
        conn,
        "SELECT id, material_id, content, position FROM pointers WHERE material_id = ANY($1) ORDER BY position, id",
        &ids,
    )
    .await?;
    let mut formulas = load_items::<Formula>(
        conn,
        "SELECT id, material_id, name, expression, explanation, position FROM formulas WHERE material_id = ANY($1) ORDER BY position, id",
        &ids,
    )
    .await?;
    let mut examples = load_items::<Example>(
        conn,
        "SELECT id, material_id, question, solution, position FROM examples WHERE material_id = ANY($1) ORDER BY position, id",
        &ids,
    )
    .await?;
    let mut problems = load_items::<PracticeProblem>(
        conn,
        "SELECT id, material_id, question, answer, solution, difficulty, position FROM practice_problems WHERE material_id = ANY($1) ORDER BY position, id",
        &ids,
    )
    .await?;

    Ok(materials
        .into_iter()
        .map(|material| MaterialContent {
            pointers: pointers.remove(&material.id).unwrap_or_default(),
            formulas: formulas.remove(&material.id).unwrap_or_default(),
            examples: examples.remove(&material.id).unwrap_or_default(),
            practice_problems: problems.remove(&material.id).unwrap_or_default(),
            material,
        })
        .collect())
}

/// GET /api/chapters/:id/materials
pub async fn chapter_materials_get(
    Extension(_user): Extension<CurrentUser>,
    ValidPath(chapter_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Vec<MaterialContent>> {
    if !chapter_exists(&mut conn, chapter_id).await? {
        return Err(ApiError::not_found(format!("Chapter {} not found", chapter_id)));
    }

    let materials = sqlx::query_as::<_, StudyMaterial>(
        "SELECT id, chapter_id, title, summary, created_at FROM study_materials WHERE chapter_id = $1 ORDER BY id",
    )
    .bind(chapter_id)
    .fetch_all(&mut conn)
    .await?;

    Ok(ApiResponse::success(load_contents(&mut conn, materials).await?))
}

/// GET /api/materials/:id
pub async fn material_get(
    Extension(_user): Extension<CurrentUser>,
    ValidPath(material_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<MaterialContent> {
    let material = fetch_material(&mut conn, material_id).await?;
    let mut contents = load_contents(&mut conn, vec![material]).await?;

    contents
        .pop()
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("Study material {} not found", material_id)))
}
