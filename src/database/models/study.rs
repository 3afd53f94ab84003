use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudySession {
    pub id: i64,
    pub user_id: i64,
    pub chapter_id: Option<i64>,
    pub duration_minutes: i32,
    pub questions_attempted: i32,
    pub study_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSettings {
    pub daily_goal_minutes: i32,
    pub daily_goal_questions: i32,
    pub target_percentile: f64,
    pub exam_date: Option<NaiveDate>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            daily_goal_minutes: 120,
            daily_goal_questions: 50,
            target_percentile: 99.0,
            exam_date: None,
        }
    }
}
