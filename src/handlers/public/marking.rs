// handlers/public/marking.rs - POST /api/marking/calculate

use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::{calculate_marks, AttemptCountsInput, MarkingResult};

#[derive(Debug, Serialize)]
pub struct MarkingPreview {
    #[serde(flatten)]
    pub result: MarkingResult,
    pub percentage_display: String,
    pub total_questions: i64,
}

/// POST /api/marking/calculate - score an attempt without storing it
pub async fn calculate_post(ValidJson(payload): ValidJson<AttemptCountsInput>) -> ApiResult<MarkingPreview> {
    let counts = payload.validated()?;
    let result = calculate_marks(&counts);

    Ok(ApiResponse::success(MarkingPreview {
        percentage_display: result.percentage_display(),
        total_questions: counts.total_questions(),
        result,
    }))
}
