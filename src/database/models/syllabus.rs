use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Module {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub section: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Module row joined with per-user progress counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModuleOverview {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub section: Option<String>,
    pub position: i32,
    pub chapter_count: i64,
    pub completed_chapters: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Chapter {
    pub id: i64,
    pub module_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Chapter row with the requesting user's completion state
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChapterWithProgress {
    pub id: i64,
    pub module_id: i64,
    pub module_name: String,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub completed: bool,
    pub completed_via: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}
