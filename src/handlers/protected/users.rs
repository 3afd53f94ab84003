// handlers/protected/users.rs - GET /api/users/search

use axum::Extension;
use serde::Deserialize;

use crate::database::models::UserSummary;
use crate::database::DbConn;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidQuery};

const MIN_QUERY_LENGTH: usize = 2;
const SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Escape LIKE wildcards so user input only ever matches literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

pub async fn search_get(
    Extension(user): Extension<CurrentUser>,
    ValidQuery(query): ValidQuery<SearchQuery>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Vec<UserSummary>> {
    let term = query.q.trim();
    if term.chars().count() < MIN_QUERY_LENGTH {
        return Err(ApiError::invalid_field(
            "q",
            format!("Search term must be at least {} characters", MIN_QUERY_LENGTH),
        ));
    }

    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, name, email
        FROM users
        WHERE id <> $1 AND (name ILIKE $2 OR email ILIKE $2)
        ORDER BY name, id
        LIMIT $3
        "#,
    )
    .bind(user.id)
    .bind(like_pattern(term))
    .bind(SEARCH_LIMIT)
    .fetch_all(&mut conn)
    .await?;

    Ok(ApiResponse::success(users))
}
