// handlers/protected/study_sessions.rs - study session log

use axum::Extension;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::Connection;

use super::chapters::chapter_exists;
use crate::database::models::StudySession;
use crate::database::DbConn;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidJson};
use crate::services::streak::{self, PgStreakStore, StreakUpdate};

const SESSION_COLUMNS: &str =
    "id, user_id, chapter_id, duration_minutes, questions_attempted, study_date, notes, created_at";

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub duration_minutes: i32,
    #[serde(default)]
    pub questions_attempted: i32,
    pub chapter_id: Option<i64>,
    /// Defaults to today; past dates backfill the log without touching the streak
    pub study_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreateSessionRequest {
    fn validate(&self, today: NaiveDate) -> Result<NaiveDate, ApiError> {
        let mut errors = FieldErrors::new();
        if !(1..=1440).contains(&self.duration_minutes) {
            errors.add("duration_minutes", "Must be between 1 and 1440");
        }
        errors.require_non_negative("questions_attempted", self.questions_attempted);
        let study_date = self.study_date.unwrap_or(today);
        if study_date > today {
            errors.add("study_date", "Cannot be in the future");
        }
        errors.into_result()?;
        Ok(study_date)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session: StudySession,
    /// Present when the session counted toward today's streak
    pub streak: Option<StreakUpdate>,
}

/// GET /api/study-sessions - newest first
pub async fn sessions_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Vec<StudySession>> {
    let sql = format!(
        "SELECT {} FROM study_sessions WHERE user_id = $1 ORDER BY study_date DESC, id DESC",
        SESSION_COLUMNS
    );
    let sessions = sqlx::query_as::<_, StudySession>(&sql)
        .bind(user.id)
        .fetch_all(&mut conn)
        .await?;

    Ok(ApiResponse::success(sessions))
}

/// POST /api/study-sessions - log a session and update the streak in one transaction
pub async fn sessions_post(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<CreateSessionRequest>,
) -> ApiResult<CreateSessionResponse> {
    let today = streak::today();
    let study_date = payload.validate(today)?;

    if let Some(chapter_id) = payload.chapter_id {
        if !chapter_exists(&mut conn, chapter_id).await? {
            return Err(ApiError::invalid_field("chapter_id", "Chapter does not exist"));
        }
    }

    let mut tx = conn.begin().await?;

    let sql = format!(
        r#"
        INSERT INTO study_sessions (user_id, chapter_id, duration_minutes, questions_attempted, study_date, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        SESSION_COLUMNS
    );
    let session = sqlx::query_as::<_, StudySession>(&sql)
        .bind(user.id)
        .bind(payload.chapter_id)
        .bind(payload.duration_minutes)
        .bind(payload.questions_attempted)
        .bind(study_date)
        .bind(payload.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()))
        .fetch_one(&mut *tx)
        .await?;

    let streak = if study_date == today {
        Some(streak::record_study_day(&mut PgStreakStore::new(&mut tx), user.id, today).await?)
    } else {
        None
    };

    tx.commit().await?;

    tracing::info!(
        "User {} logged {} minutes for {}",
        user.id,
        session.duration_minutes,
        session.study_date
    );

    Ok(ApiResponse::created(CreateSessionResponse { session, streak }))
}
