// handlers/protected/test_results.rs - mock/sectional/chapter test results

use axum::Extension;
use serde::{Deserialize, Serialize};
use sqlx::Connection;

use crate::database::models::TestResult;
use crate::database::DbConn;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Deleted, ValidJson, ValidPath};
use crate::services::streak::{self, PgStreakStore, StreakUpdate};
use crate::services::{calculate_marks, AttemptCountsInput};
use crate::types::TestType;

pub(crate) const TEST_RESULT_COLUMNS: &str = "id, user_id, test_name, test_type, section, \
    correct_mcq, incorrect_mcq, unattempted_mcq, correct_fitb, incorrect_fitb, \
    total_marks, max_marks, percentage, time_taken_minutes, taken_at";

#[derive(Debug, Deserialize)]
pub struct SubmitTestRequest {
    pub test_name: String,
    pub test_type: TestType,
    pub section: Option<String>,
    #[serde(flatten)]
    pub counts: AttemptCountsInput,
    pub time_taken_minutes: Option<i32>,
}

impl SubmitTestRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_text("test_name", &self.test_name);
        self.counts.check(&mut errors);
        if let Some(minutes) = self.time_taken_minutes {
            errors.require_non_negative("time_taken_minutes", minutes);
        }
        errors.into_result()
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitTestResponse {
    pub result: TestResult,
    pub percentage_display: String,
    pub streak: StreakUpdate,
}

/// Marks are stored in INTEGER columns
fn to_column(value: i64) -> Result<i32, ApiError> {
    i32::try_from(value).map_err(|_| ApiError::bad_request("Attempt counts are too large"))
}

/// GET /api/tests - newest first
pub async fn tests_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Vec<TestResult>> {
    let sql = format!(
        "SELECT {} FROM test_results WHERE user_id = $1 ORDER BY taken_at DESC, id DESC",
        TEST_RESULT_COLUMNS
    );
    let results = sqlx::query_as::<_, TestResult>(&sql)
        .bind(user.id)
        .fetch_all(&mut conn)
        .await?;

    Ok(ApiResponse::success(results))
}

/// POST /api/tests - score, store, and count the day toward the streak
pub async fn tests_post(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<SubmitTestRequest>,
) -> ApiResult<SubmitTestResponse> {
    payload.validate()?;

    let counts = payload.counts.to_counts();
    let marks = calculate_marks(&counts);

    let mut tx = conn.begin().await?;

    let sql = format!(
        r#"
        INSERT INTO test_results (
            user_id, test_name, test_type, section,
            correct_mcq, incorrect_mcq, unattempted_mcq, correct_fitb, incorrect_fitb,
            total_marks, max_marks, percentage, time_taken_minutes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {}
        "#,
        TEST_RESULT_COLUMNS
    );
    let result = sqlx::query_as::<_, TestResult>(&sql)
        .bind(user.id)
        .bind(payload.test_name.trim())
        .bind(payload.test_type.as_str())
        .bind(payload.section.as_deref().map(str::trim).filter(|s| !s.is_empty()))
        .bind(payload.counts.correct_mcq)
        .bind(payload.counts.incorrect_mcq)
        .bind(payload.counts.unattempted_mcq)
        .bind(payload.counts.correct_fitb)
        .bind(payload.counts.incorrect_fitb)
        .bind(to_column(marks.total_marks)?)
        .bind(to_column(marks.max_marks)?)
        .bind(marks.percentage)
        .bind(payload.time_taken_minutes)
        .fetch_one(&mut *tx)
        .await?;

    let streak = streak::record_study_day(&mut PgStreakStore::new(&mut tx), user.id, streak::today()).await?;

    tx.commit().await?;

    tracing::info!(
        "User {} recorded test {} ({} / {})",
        user.id,
        result.id,
        result.total_marks,
        result.max_marks
    );

    Ok(ApiResponse::created(SubmitTestResponse {
        percentage_display: marks.percentage_display(),
        result,
        streak,
    }))
}

/// GET /api/tests/:id - only the owner's results are visible
pub async fn test_get(
    Extension(user): Extension<CurrentUser>,
    ValidPath(test_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<TestResult> {
    let sql = format!(
        "SELECT {} FROM test_results WHERE id = $1 AND user_id = $2",
        TEST_RESULT_COLUMNS
    );
    sqlx::query_as::<_, TestResult>(&sql)
        .bind(test_id)
        .bind(user.id)
        .fetch_optional(&mut conn)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("Test result {} not found", test_id)))
}

/// DELETE /api/tests/:id
pub async fn test_delete(
    Extension(user): Extension<CurrentUser>,
    ValidPath(test_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Deleted> {
    let result = sqlx::query("DELETE FROM test_results WHERE id = $1 AND user_id = $2")
        .bind(test_id)
        .bind(user.id)
        .execute(&mut conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Test result {} not found", test_id)));
    }
    Ok(ApiResponse::success(Deleted::new(test_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flattened_counts_with_defaults() {
        let request: SubmitTestRequest = serde_json::from_str(
            r#"{"test_name": "Mock 3", "test_type": "mock", "correct_mcq": 10, "incorrect_mcq": 2, "unattempted_mcq": 3}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.counts.correct_fitb, 0);
        assert_eq!(calculate_marks(&request.counts.to_counts()).total_marks, 28);
    }

    #[test]
    fn rejects_unknown_test_type() {
        let parsed = serde_json::from_str::<SubmitTestRequest>(r#"{"test_name": "x", "test_type": "weekly"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn requires_name_and_non_negative_counts() {
        let request: SubmitTestRequest =
            serde_json::from_str(r#"{"test_name": "", "test_type": "sectional", "incorrect_mcq": -4}"#).unwrap();
        let body = request.validate().unwrap_err().to_json();
        assert_eq!(body["field_errors"]["test_name"], "This field is required");
        assert_eq!(body["field_errors"]["incorrect_mcq"], "Must not be negative");
    }
}
