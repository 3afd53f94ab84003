mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::expect_error;

#[tokio::test]
async fn calculates_cat_marks_without_authentication() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/marking/calculate"))
        .json(&json!({"correct_mcq": 10, "incorrect_mcq": 2, "unattempted_mcq": 3}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total_marks"], 28);
    assert_eq!(body["data"]["max_marks"], 45);
    assert_eq!(body["data"]["percentage_display"], "62.22");
    assert_eq!(body["data"]["total_questions"], 15);
    Ok(())
}

#[tokio::test]
async fn empty_attempt_scores_zero() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/marking/calculate"))
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["total_marks"], 0);
    assert_eq!(body["data"]["max_marks"], 0);
    assert_eq!(body["data"]["percentage_display"], "0.00");
    Ok(())
}

#[tokio::test]
async fn negative_counts_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/marking/calculate"))
        .json(&json!({"correct_mcq": 4, "incorrect_fitb": -1}))
        .send()
        .await?;

    let body = expect_error(res, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await?;
    assert_eq!(body["field_errors"]["incorrect_fitb"], "Must not be negative");
    Ok(())
}
