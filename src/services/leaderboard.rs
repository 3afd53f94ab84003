use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardScope {
    #[default]
    Global,
    Friends,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardMetric {
    /// Current consecutive-day streak
    #[default]
    Streak,
    /// Minutes studied over the last seven days
    StudyTime,
    /// Average test percentage
    Tests,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: i64,
    pub name: String,
    pub score: f64,
    pub is_current_user: bool,
}

/// Competition ranking ("1224"): tied scores share a rank and the next
/// distinct score skips past them. Input must already be sorted by score
/// descending.
pub fn assign_ranks(rows: Vec<(i64, String, f64)>, current_user_id: i64) -> Vec<LeaderboardEntry> {
    let mut entries = Vec::with_capacity(rows.len());
    let mut previous_score: Option<f64> = None;
    let mut rank = 0u32;

    for (index, (user_id, name, score)) in rows.into_iter().enumerate() {
        if previous_score != Some(score) {
            rank = index as u32 + 1;
            previous_score = Some(score);
        }
        entries.push(LeaderboardEntry {
            rank,
            user_id,
            name,
            score,
            is_current_user: user_id == current_user_id,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, score: f64) -> (i64, String, f64) {
        (id, format!("user-{}", id), score)
    }

    #[test]
    fn ties_share_a_rank() {
        let ranked = assign_ranks(vec![row(1, 30.0), row(2, 12.0), row(3, 12.0), row(4, 5.0)], 3);
        let ranks: Vec<u32> = ranked.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
        assert!(ranked[2].is_current_user);
        assert!(!ranked[1].is_current_user);
    }

    #[test]
    fn empty_board() {
        assert!(assign_ranks(Vec::new(), 1).is_empty());
    }

    #[test]
    fn metric_and_scope_parse_from_query_strings() {
        let metric: LeaderboardMetric = serde_json::from_str("\"study_time\"").unwrap();
        assert_eq!(metric, LeaderboardMetric::StudyTime);
        let scope: LeaderboardScope = serde_json::from_str("\"friends\"").unwrap();
        assert_eq!(scope, LeaderboardScope::Friends);
        assert_eq!(LeaderboardMetric::default(), LeaderboardMetric::Streak);
    }
}
