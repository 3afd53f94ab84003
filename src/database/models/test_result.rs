use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResult {
    pub id: i64,
    pub user_id: i64,
    pub test_name: String,
    pub test_type: String,
    pub section: Option<String>,
    pub correct_mcq: i32,
    pub incorrect_mcq: i32,
    pub unattempted_mcq: i32,
    pub correct_fitb: i32,
    pub incorrect_fitb: i32,
    pub total_marks: i32,
    pub max_marks: i32,
    pub percentage: f64,
    pub time_taken_minutes: Option<i32>,
    pub taken_at: DateTime<Utc>,
}
