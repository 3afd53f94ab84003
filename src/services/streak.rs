//! Daily study streak tracking.
//!
//! Every handler that counts a study day (logging a session, submitting a
//! test, explicit check-in) goes through [`record_study_day`].

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

use crate::database::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StreakState {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_study_date: Option<NaiveDate>,
}

impl StreakState {
    /// Streak reported for a user who has never studied
    pub fn empty() -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            last_study_date: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// First recorded study day
    Started,
    /// Already counted today; nothing changed
    AlreadyCounted,
    /// Studied yesterday too
    Continued,
    /// Gap of two or more days (or no usable date)
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakUpdate {
    #[serde(flatten)]
    pub streak: StreakState,
    pub transition: StreakTransition,
}

/// Pure transition from the previous streak row (if any) to the row for `today`
pub fn advance_streak(previous: Option<&StreakState>, today: NaiveDate) -> StreakUpdate {
    let Some(prev) = previous else {
        return StreakUpdate {
            streak: StreakState {
                current_streak: 1,
                longest_streak: 1,
                last_study_date: Some(today),
            },
            transition: StreakTransition::Started,
        };
    };

    let yesterday = today.checked_sub_days(Days::new(1));

    let (current_streak, transition) = match prev.last_study_date {
        Some(last) if last == today => {
            return StreakUpdate {
                streak: *prev,
                transition: StreakTransition::AlreadyCounted,
            }
        }
        Some(last) if Some(last) == yesterday => (prev.current_streak + 1, StreakTransition::Continued),
        _ => (1, StreakTransition::Reset),
    };

    StreakUpdate {
        streak: StreakState {
            current_streak,
            longest_streak: prev.longest_streak.max(current_streak),
            last_study_date: Some(today),
        },
        transition,
    }
}

/// The calendar day streaks are counted against
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Storage seam for the read-modify-write around [`advance_streak`]
#[async_trait]
pub trait StreakStore: Send {
    /// Read the user's streak row, holding it against concurrent writers
    /// until the surrounding unit of work ends
    async fn lock_streak(&mut self, user_id: i64) -> Result<Option<StreakState>, DatabaseError>;

    async fn save_streak(&mut self, user_id: i64, streak: &StreakState) -> Result<(), DatabaseError>;
}

/// Count `today` as a study day for the user and persist the result
pub async fn record_study_day<S>(store: &mut S, user_id: i64, today: NaiveDate) -> Result<StreakUpdate, DatabaseError>
where
    S: StreakStore + ?Sized,
{
    let previous = store.lock_streak(user_id).await?;
    let update = advance_streak(previous.as_ref(), today);

    if update.transition != StreakTransition::AlreadyCounted {
        store.save_streak(user_id, &update.streak).await?;
    }

    tracing::debug!(
        "Streak for user {}: {:?} -> current {} (longest {})",
        user_id,
        update.transition,
        update.streak.current_streak,
        update.streak.longest_streak
    );
    Ok(update)
}

/// PostgreSQL store. Run it on a transaction so the row lock taken by
/// `lock_streak` is held until commit.
pub struct PgStreakStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgStreakStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c> StreakStore for PgStreakStore<'c> {
    async fn lock_streak(&mut self, user_id: i64) -> Result<Option<StreakState>, DatabaseError> {
        let row = sqlx::query_as::<_, StreakState>(
            "SELECT current_streak, longest_streak, last_study_date FROM streaks WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row)
    }

    async fn save_streak(&mut self, user_id: i64, streak: &StreakState) -> Result<(), DatabaseError> {
        // Upsert so two first-ever check-ins racing on a missing row both land on the same row
        sqlx::query(
            r#"
            INSERT INTO streaks (user_id, current_streak, longest_streak, last_study_date, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET current_streak = EXCLUDED.current_streak,
                longest_streak = EXCLUDED.longest_streak,
                last_study_date = EXCLUDED.last_study_date,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(streak.current_streak)
        .bind(streak.longest_streak)
        .bind(streak.last_study_date)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }
}

/// Read-only lookup used by the dashboard and streak endpoints
pub async fn load_streak(conn: &mut PgConnection, user_id: i64) -> Result<StreakState, DatabaseError> {
    let row = sqlx::query_as::<_, StreakState>(
        "SELECT current_streak, longest_streak, last_study_date FROM streaks WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.unwrap_or_else(StreakState::empty))
}
