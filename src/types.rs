/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Unknown role strings are treated as the least privileged role
    pub fn from_db(value: &str) -> Self {
        match value {
            "admin" => UserRole::Admin,
            _ => UserRole::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Mock,
    Sectional,
    Chapter,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Mock => "mock",
            TestType::Sectional => "sectional",
            TestType::Chapter => "chapter",
        }
    }
}

/// How a chapter ended up marked as complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMethod {
    Study,
    SkipTest,
}

impl CompletionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionMethod::Study => "study",
            CompletionMethod::SkipTest => "skip_test",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendRequestStatus::Pending => "pending",
            FriendRequestStatus::Accepted => "accepted",
            FriendRequestStatus::Rejected => "rejected",
        }
    }
}

/// Content items hanging off a study material, addressed by their URL segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    #[serde(rename = "pointers")]
    Pointer,
    #[serde(rename = "formulas")]
    Formula,
    #[serde(rename = "examples")]
    Example,
    #[serde(rename = "practice-problems")]
    PracticeProblem,
}

impl ContentKind {
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Pointer => "pointers",
            ContentKind::Formula => "formulas",
            ContentKind::Example => "examples",
            ContentKind::PracticeProblem => "practice_problems",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roles_fall_back_to_user() {
        assert_eq!(UserRole::from_db("admin"), UserRole::Admin);
        assert_eq!(UserRole::from_db("user"), UserRole::User);
        assert_eq!(UserRole::from_db("superuser"), UserRole::User);
    }

    #[test]
    fn content_kind_parses_url_segments() {
        let kind: ContentKind = serde_json::from_str("\"practice-problems\"").unwrap();
        assert_eq!(kind, ContentKind::PracticeProblem);
        assert_eq!(kind.table(), "practice_problems");
        assert!(serde_json::from_str::<ContentKind>("\"videos\"").is_err());
    }

    #[test]
    fn completion_method_serializes_snake_case() {
        assert_eq!(serde_json::to_value(CompletionMethod::SkipTest).unwrap(), "skip_test");
        assert_eq!(CompletionMethod::SkipTest.as_str(), "skip_test");
    }
}
