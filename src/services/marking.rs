//! CAT marking scheme: +3 for a correct answer, -1 for an incorrect one,
//! 0 for an unattempted question. The same weights apply to MCQ and
//! fill-in-the-blank questions.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldErrors};

pub const MARKS_PER_CORRECT: i64 = 3;
pub const PENALTY_PER_INCORRECT: i64 = 1;

/// Attempt counts for one test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCounts {
    pub correct_mcq: u32,
    pub incorrect_mcq: u32,
    pub unattempted_mcq: u32,
    pub correct_fitb: u32,
    pub incorrect_fitb: u32,
}

impl AttemptCounts {
    pub fn total_questions(&self) -> i64 {
        [
            self.correct_mcq,
            self.incorrect_mcq,
            self.unattempted_mcq,
            self.correct_fitb,
            self.incorrect_fitb,
        ]
        .iter()
        .map(|&n| i64::from(n))
        .sum()
    }
}

/// Attempt counts as sent by clients. Signed so negative input can be
/// reported field by field instead of failing deserialization.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct AttemptCountsInput {
    pub correct_mcq: i32,
    pub incorrect_mcq: i32,
    pub unattempted_mcq: i32,
    pub correct_fitb: i32,
    pub incorrect_fitb: i32,
}

impl AttemptCountsInput {
    pub fn check(&self, errors: &mut FieldErrors) {
        errors.require_non_negative("correct_mcq", self.correct_mcq);
        errors.require_non_negative("incorrect_mcq", self.incorrect_mcq);
        errors.require_non_negative("unattempted_mcq", self.unattempted_mcq);
        errors.require_non_negative("correct_fitb", self.correct_fitb);
        errors.require_non_negative("incorrect_fitb", self.incorrect_fitb);
    }

    /// Only meaningful after `check` reported no errors
    pub fn to_counts(self) -> AttemptCounts {
        let non_negative = |n: i32| n.max(0).unsigned_abs();
        AttemptCounts {
            correct_mcq: non_negative(self.correct_mcq),
            incorrect_mcq: non_negative(self.incorrect_mcq),
            unattempted_mcq: non_negative(self.unattempted_mcq),
            correct_fitb: non_negative(self.correct_fitb),
            incorrect_fitb: non_negative(self.incorrect_fitb),
        }
    }

    pub fn validated(self) -> Result<AttemptCounts, ApiError> {
        let mut errors = FieldErrors::new();
        self.check(&mut errors);
        errors.into_result()?;
        Ok(self.to_counts())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkingResult {
    pub total_marks: i64,
    pub max_marks: i64,
    pub percentage: f64,
}

impl MarkingResult {
    pub fn percentage_display(&self) -> String {
        format!("{:.2}", self.percentage)
    }
}

pub fn calculate_marks(counts: &AttemptCounts) -> MarkingResult {
    let raw = MARKS_PER_CORRECT * i64::from(counts.correct_mcq)
        - PENALTY_PER_INCORRECT * i64::from(counts.incorrect_mcq)
        + MARKS_PER_CORRECT * i64::from(counts.correct_fitb)
        - PENALTY_PER_INCORRECT * i64::from(counts.incorrect_fitb);

    let total_marks = raw.max(0);
    let max_marks = MARKS_PER_CORRECT * counts.total_questions();

    let percentage = if max_marks == 0 {
        0.0
    } else {
        (100.0 * total_marks as f64 / max_marks as f64).max(0.0)
    };

    MarkingResult {
        total_marks,
        max_marks,
        percentage,
    }
}

/// Outcome of a chapter skip test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkipTestOutcome {
    pub passed: bool,
    pub percentage: f64,
    pub required_percentage: f64,
}

/// A skip test passes when the share of correct answers reaches the threshold.
/// An empty test never passes.
pub fn evaluate_skip_test(correct: u32, total: u32, required_percentage: f64) -> SkipTestOutcome {
    let percentage = if total == 0 {
        0.0
    } else {
        100.0 * f64::from(correct.min(total)) / f64::from(total)
    };

    SkipTestOutcome {
        passed: total > 0 && percentage >= required_percentage,
        percentage,
        required_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_typical_mcq_attempt() {
        let result = calculate_marks(&AttemptCounts {
            correct_mcq: 10,
            incorrect_mcq: 2,
            unattempted_mcq: 3,
            ..Default::default()
        });

        assert_eq!(result.total_marks, 28);
        assert_eq!(result.max_marks, 45);
        assert_eq!(result.percentage_display(), "62.22");
    }

    #[test]
    fn all_zero_counts_score_zero() {
        let result = calculate_marks(&AttemptCounts::default());
        assert_eq!(result.total_marks, 0);
        assert_eq!(result.max_marks, 0);
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn negative_totals_clamp_to_zero() {
        let result = calculate_marks(&AttemptCounts {
            incorrect_mcq: 100,
            ..Default::default()
        });
        assert_eq!(result.total_marks, 0);
        assert_eq!(result.max_marks, 300);
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn fill_in_the_blank_uses_same_weights() {
        let result = calculate_marks(&AttemptCounts {
            correct_mcq: 4,
            incorrect_mcq: 1,
            correct_fitb: 2,
            incorrect_fitb: 1,
            unattempted_mcq: 2,
        });
        // 12 - 1 + 6 - 1
        assert_eq!(result.total_marks, 16);
        assert_eq!(result.max_marks, 30);
        assert_eq!(result.percentage_display(), "53.33");
    }

    #[test]
    fn perfect_score_is_one_hundred_percent() {
        let result = calculate_marks(&AttemptCounts {
            correct_mcq: 22,
            correct_fitb: 2,
            ..Default::default()
        });
        assert_eq!(result.total_marks, 72);
        assert_eq!(result.percentage, 100.0);
    }

    #[test]
    fn skip_test_threshold_is_inclusive() {
        assert!(evaluate_skip_test(7, 10, 70.0).passed);
        assert!(!evaluate_skip_test(6, 10, 70.0).passed);
    }

    #[test]
    fn empty_skip_test_never_passes() {
        let outcome = evaluate_skip_test(0, 0, 0.0);
        assert!(!outcome.passed);
        assert_eq!(outcome.percentage, 0.0);
    }

    #[test]
    fn skip_test_caps_correct_at_total() {
        let outcome = evaluate_skip_test(12, 10, 70.0);
        assert_eq!(outcome.percentage, 100.0);
    }

    #[test]
    fn negative_counts_are_rejected_per_field() {
        let input = AttemptCountsInput {
            correct_mcq: 3,
            incorrect_fitb: -2,
            ..Default::default()
        };
        let body = input.validated().unwrap_err().to_json();
        assert_eq!(body["field_errors"]["incorrect_fitb"], "Must not be negative");
        assert!(body["field_errors"].get("correct_mcq").is_none());
    }

    #[test]
    fn valid_counts_convert() {
        let input = AttemptCountsInput {
            correct_mcq: 10,
            incorrect_mcq: 2,
            unattempted_mcq: 3,
            ..Default::default()
        };
        let counts = input.validated().unwrap();
        assert_eq!(counts.correct_mcq, 10);
        assert_eq!(counts.total_questions(), 15);
    }

    #[test]
    fn missing_counts_default_to_zero() {
        let input: AttemptCountsInput = serde_json::from_str(r#"{"correct_fitb": 4}"#).unwrap();
        let counts = input.validated().unwrap();
        assert_eq!(counts.correct_fitb, 4);
        assert_eq!(counts.total_questions(), 4);
        assert_eq!(calculate_marks(&counts).total_marks, 12);
    }
}
