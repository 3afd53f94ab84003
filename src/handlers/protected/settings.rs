// handlers/protected/settings.rs - per-user goal configuration

use axum::Extension;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use sqlx::PgConnection;

use crate::database::models::UserSettings;
use crate::database::{DatabaseError, DbConn};
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidJson};

/// Stored settings, or the defaults for users who never saved any
pub(crate) async fn load_settings(conn: &mut PgConnection, user_id: i64) -> Result<UserSettings, DatabaseError> {
    let row = sqlx::query_as::<_, UserSettings>(
        "SELECT daily_goal_minutes, daily_goal_questions, target_percentile, exam_date FROM user_settings WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.unwrap_or_default())
}

/// Partial update; absent fields keep their current value. `exam_date: null`
/// clears the date.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub daily_goal_minutes: Option<i32>,
    pub daily_goal_questions: Option<i32>,
    pub target_percentile: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub exam_date: Option<Option<NaiveDate>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateSettingsRequest {
    fn apply(self, mut settings: UserSettings) -> Result<UserSettings, ApiError> {
        if let Some(v) = self.daily_goal_minutes {
            settings.daily_goal_minutes = v;
        }
        if let Some(v) = self.daily_goal_questions {
            settings.daily_goal_questions = v;
        }
        if let Some(v) = self.target_percentile {
            settings.target_percentile = v;
        }
        if let Some(v) = self.exam_date {
            settings.exam_date = v;
        }

        let mut errors = FieldErrors::new();
        if !(1..=1440).contains(&settings.daily_goal_minutes) {
            errors.add("daily_goal_minutes", "Must be between 1 and 1440");
        }
        errors.require_non_negative("daily_goal_questions", settings.daily_goal_questions);
        if !settings.target_percentile.is_finite() || !(0.0..=100.0).contains(&settings.target_percentile) {
            errors.add("target_percentile", "Must be between 0 and 100");
        }
        errors.into_result()?;

        Ok(settings)
    }
}

/// GET /api/settings
pub async fn settings_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<UserSettings> {
    Ok(ApiResponse::success(load_settings(&mut conn, user.id).await?))
}

/// PUT /api/settings
pub async fn settings_put(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<UpdateSettingsRequest>,
) -> ApiResult<UserSettings> {
    let current = load_settings(&mut conn, user.id).await?;
    let settings = payload.apply(current)?;

    let saved = sqlx::query_as::<_, UserSettings>(
        r#"
        INSERT INTO user_settings (user_id, daily_goal_minutes, daily_goal_questions, target_percentile, exam_date, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (user_id) DO UPDATE
        SET daily_goal_minutes = EXCLUDED.daily_goal_minutes,
            daily_goal_questions = EXCLUDED.daily_goal_questions,
            target_percentile = EXCLUDED.target_percentile,
            exam_date = EXCLUDED.exam_date,
            updated_at = NOW()
        RETURNING daily_goal_minutes, daily_goal_questions, target_percentile, exam_date
        "#,
    )
    .bind(user.id)
    .bind(settings.daily_goal_minutes)
    .bind(settings.daily_goal_questions)
    .bind(settings.target_percentile)
    .bind(settings.exam_date)
    .fetch_one(&mut conn)
    .await?;

    Ok(ApiResponse::success(saved))
}
