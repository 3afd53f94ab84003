// handlers/protected/dashboard.rs - GET /api/dashboard

use axum::Extension;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use super::settings::load_settings;
use super::test_results::TEST_RESULT_COLUMNS;
use crate::config;
use crate::database::models::{TestResult, UserSettings};
use crate::database::DbConn;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::streak::{self, load_streak, StreakState};

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: CurrentUser,
    pub streak: StreakState,
    pub settings: UserSettings,
    pub today: TodayProgress,
    pub totals: StudyTotals,
    pub syllabus: SyllabusProgress,
    pub recent_tests: Vec<TestResult>,
    pub days_until_exam: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TodayProgress {
    pub date: NaiveDate,
    pub minutes_studied: i64,
    pub questions_attempted: i64,
    pub minutes_goal_percentage: f64,
    pub questions_goal_percentage: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct StudyTotals {
    pub total_minutes: i64,
    pub total_questions: i64,
    pub session_count: i64,
    pub tests_taken: i64,
}

#[derive(Debug, Serialize)]
pub struct SyllabusProgress {
    pub total_chapters: i64,
    pub completed_chapters: i64,
    pub percentage: f64,
}

/// Share of a daily goal reached, capped at 100. A zero goal counts as met.
pub fn goal_progress(done: i64, goal: i32) -> f64 {
    if goal <= 0 {
        return 100.0;
    }
    (100.0 * done as f64 / f64::from(goal)).clamp(0.0, 100.0)
}

fn share(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Whole days from `today` until the exam; `None` once the exam is past
pub fn days_until(exam_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    exam_date
        .map(|exam| (exam - today).num_days())
        .filter(|days| *days >= 0)
}

pub async fn dashboard_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Dashboard> {
    let today = streak::today();
    let streak = load_streak(&mut conn, user.id).await?;
    let settings = load_settings(&mut conn, user.id).await?;

    let (minutes_today, questions_today): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(duration_minutes), 0)::BIGINT, COALESCE(SUM(questions_attempted), 0)::BIGINT
        FROM study_sessions
        WHERE user_id = $1 AND study_date = $2
        "#,
    )
    .bind(user.id)
    .bind(today)
    .fetch_one(&mut conn)
    .await?;

    let totals = sqlx::query_as::<_, StudyTotals>(
        r#"
        SELECT COALESCE(SUM(s.duration_minutes), 0)::BIGINT AS total_minutes,
               COALESCE(SUM(s.questions_attempted), 0)::BIGINT AS total_questions,
               COUNT(s.id) AS session_count,
               (SELECT COUNT(*) FROM test_results t WHERE t.user_id = $1) AS tests_taken
        FROM study_sessions s
        WHERE s.user_id = $1
        "#,
    )
    .bind(user.id)
    .fetch_one(&mut conn)
    .await?;

    let (total_chapters, completed_chapters): (i64, i64) = sqlx::query_as(
        r#"
        SELECT (SELECT COUNT(*) FROM chapters),
               (SELECT COUNT(*) FROM chapter_progress WHERE user_id = $1)
        "#,
    )
    .bind(user.id)
    .fetch_one(&mut conn)
    .await?;

    let sql = format!(
        "SELECT {} FROM test_results WHERE user_id = $1 ORDER BY taken_at DESC, id DESC LIMIT $2",
        TEST_RESULT_COLUMNS
    );
    let recent_tests = sqlx::query_as::<_, TestResult>(&sql)
        .bind(user.id)
        .bind(config::config().study.recent_activity_limit)
        .fetch_all(&mut conn)
        .await?;

    let dashboard = Dashboard {
        today: TodayProgress {
            date: today,
            minutes_studied: minutes_today,
            questions_attempted: questions_today,
            minutes_goal_percentage: goal_progress(minutes_today, settings.daily_goal_minutes),
            questions_goal_percentage: goal_progress(questions_today, settings.daily_goal_questions),
        },
        syllabus: SyllabusProgress {
            total_chapters,
            completed_chapters,
            percentage: share(completed_chapters, total_chapters),
        },
        days_until_exam: days_until(settings.exam_date, today),
        user,
        streak,
        settings,
        totals,
        recent_tests,
    };

    Ok(ApiResponse::success(dashboard))
}
