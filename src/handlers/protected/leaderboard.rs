// handlers/protected/leaderboard.rs - GET /api/leaderboard?scope=&metric=

use axum::Extension;
use chrono::Days;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::database::DbConn;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidQuery};
use crate::services::streak;
use crate::services::{assign_ranks, LeaderboardEntry, LeaderboardMetric, LeaderboardScope};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeaderboardQuery {
    pub scope: LeaderboardScope,
    pub metric: LeaderboardMetric,
}

#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub scope: LeaderboardScope,
    pub metric: LeaderboardMetric,
    pub entries: Vec<LeaderboardEntry>,
}

/// How far back a metric looks, in days before today. `None` means all time.
fn window_days(metric: LeaderboardMetric) -> Option<u64> {
    match metric {
        LeaderboardMetric::Streak => Some(1),
        LeaderboardMetric::StudyTime => Some(6),
        LeaderboardMetric::Tests => None,
    }
}

/// Scored rows for every user in scope. $1 = current user; windowed metrics
/// take the cutoff date as $2.
///
/// A streak only counts while it is still alive (studied today or yesterday).
fn score_sql(metric: LeaderboardMetric) -> &'static str {
    match metric {
        LeaderboardMetric::Streak => {
            r#"
            SELECT u.id, u.name,
                   (CASE WHEN s.last_study_date >= $2 THEN s.current_streak ELSE 0 END)::DOUBLE PRECISION AS score
            FROM users u
            JOIN streaks s ON s.user_id = u.id
            "#
        }
        LeaderboardMetric::StudyTime => {
            r#"
            SELECT u.id, u.name, SUM(ss.duration_minutes)::DOUBLE PRECISION AS score
            FROM users u
            JOIN study_sessions ss ON ss.user_id = u.id AND ss.study_date >= $2
            "#
        }
        LeaderboardMetric::Tests => {
            r#"
            SELECT u.id, u.name, AVG(t.percentage)::DOUBLE PRECISION AS score
            FROM users u
            JOIN test_results t ON t.user_id = u.id
            "#
        }
    }
}

fn scope_sql(scope: LeaderboardScope) -> &'static str {
    match scope {
        LeaderboardScope::Global => "WHERE $1 = $1",
        LeaderboardScope::Friends => {
            "WHERE (u.id = $1 OR u.id IN (SELECT friend_id FROM friendships WHERE user_id = $1))"
        }
    }
}

fn build_query(scope: LeaderboardScope, metric: LeaderboardMetric) -> String {
    let group_by = match metric {
        LeaderboardMetric::Streak => "",
        LeaderboardMetric::StudyTime | LeaderboardMetric::Tests => "GROUP BY u.id, u.name",
    };
    let limit = if window_days(metric).is_some() { "$3" } else { "$2" };
    format!(
        "SELECT id, name, score FROM ({} {} {}) scored ORDER BY score DESC, name, id LIMIT {}",
        score_sql(metric),
        scope_sql(scope),
        group_by,
        limit
    )
}

pub async fn leaderboard_get(
    Extension(user): Extension<CurrentUser>,
    ValidQuery(query): ValidQuery<LeaderboardQuery>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Leaderboard> {
    let sql = build_query(query.scope, query.metric);
    let mut scored = sqlx::query_as::<_, (i64, String, f64)>(&sql).bind(user.id);
    if let Some(days) = window_days(query.metric) {
        let today = streak::today();
        scored = scored.bind(today.checked_sub_days(Days::new(days)).unwrap_or(today));
    }
    let rows = scored
        .bind(config::config().study.leaderboard_limit)
        .fetch_all(&mut conn)
        .await?;

    Ok(ApiResponse::success(Leaderboard {
        scope: query.scope,
        metric: query.metric,
        entries: assign_ranks(rows, user.id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_to_global_streak() {
        let query: LeaderboardQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.scope, LeaderboardScope::Global);
        assert_eq!(query.metric, LeaderboardMetric::Streak);
    }

    #[test]
    fn parses_scope_and_metric() {
        let query: LeaderboardQuery = serde_json::from_str(r#"{"scope": "friends", "metric": "study_time"}"#).unwrap();
        assert_eq!(query.scope, LeaderboardScope::Friends);
        assert_eq!(query.metric, LeaderboardMetric::StudyTime);
        assert!(serde_json::from_str::<LeaderboardQuery>(r#"{"metric": "xp"}"#).is_err());
    }

    #[test]
    fn aggregated_metrics_group_by_user() {
        assert!(build_query(LeaderboardScope::Global, LeaderboardMetric::Tests).contains("GROUP BY u.id"));
        assert!(!build_query(LeaderboardScope::Global, LeaderboardMetric::Streak).contains("GROUP BY"));
        assert!(build_query(LeaderboardScope::Friends, LeaderboardMetric::Streak).contains("friendships"));
    }

    #[test]
    fn placeholders_match_bound_parameters() {
        let tests = build_query(LeaderboardScope::Global, LeaderboardMetric::Tests);
        assert_eq!(tests.matches("$2").count(), 1);
        assert!(tests.ends_with("LIMIT $2"));
        assert!(!tests.contains("$3"));

        for metric in [LeaderboardMetric::Streak, LeaderboardMetric::StudyTime] {
            let sql = build_query(LeaderboardScope::Friends, metric);
            assert!(sql.contains(">= $2"));
            assert!(sql.ends_with("LIMIT $3"));
        }
    }
}
