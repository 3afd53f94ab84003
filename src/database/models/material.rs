use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudyMaterial {
    pub id: i64,
    pub chapter_id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pointer {
    pub id: i64,
    pub material_id: i64,
    pub content: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Formula {
    pub id: i64,
    pub material_id: i64,
    pub name: String,
    pub expression: String,
    pub explanation: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Example {
    pub id: i64,
    pub material_id: i64,
    pub question: String,
    pub solution: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PracticeProblem {
    pub id: i64,
    pub material_id: i64,
    pub question: String,
    pub answer: String,
    pub solution: Option<String>,
    pub difficulty: Option<String>,
    pub position: i32,
}

/// A study material together with every content item attached to it
#[derive(Debug, Clone, Serialize)]
pub struct MaterialContent {
    #[serde(flatten)]
    pub material: StudyMaterial,
    pub pointers: Vec<Pointer>,
    pub formulas: Vec<Formula>,
    pub examples: Vec<Example>,
    pub practice_problems: Vec<PracticeProblem>,
}
