pub mod leaderboard;
pub mod marking;
pub mod streak;

pub use leaderboard::{assign_ranks, LeaderboardEntry, LeaderboardMetric, LeaderboardScope};
pub use marking::{calculate_marks, evaluate_skip_test, AttemptCounts, AttemptCountsInput, MarkingResult, SkipTestOutcome};
pub use streak::{advance_streak, record_study_day, PgStreakStore, StreakState, StreakStore, StreakTransition, StreakUpdate};
