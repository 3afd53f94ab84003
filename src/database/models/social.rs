use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendRequest {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Incoming request joined with the sender's public details
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IncomingFriendRequest {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub sender_email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Friend {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub current_streak: i32,
    pub since: DateTime<Utc>,
}
