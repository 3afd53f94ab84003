mod common;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::{Connection, PgConnection};

use common::TestServer;

const CONCURRENT_CHECK_INS: usize = 10;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn days_ago(days: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(days)).unwrap()
}

/// Write a streak row that last counted `last_study_date`
async fn seed_streak(user_id: i64, current: i32, longest: i32, last_study_date: NaiveDate) -> Result<()> {
    let url = common::test_database_url().context("database url missing")?;
    let mut conn = PgConnection::connect(&url).await?;
    sqlx::query(
        "INSERT INTO streaks (user_id, current_streak, longest_streak, last_study_date) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(current)
    .bind(longest)
    .bind(last_study_date)
    .execute(&mut conn)
    .await?;
    conn.close().await?;
    Ok(())
}

async fn get_streak(server: &TestServer, token: &str) -> Result<Value> {
    let res = reqwest::Client::new()
        .get(server.url("/api/streak"))
        .bearer_auth(token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(res.json::<Value>().await?["data"].clone())
}

/// Fire check-ins in parallel and return each response's `transition`
async fn check_in_concurrently(server: &TestServer, token: &str) -> Result<Vec<String>> {
    let client = reqwest::Client::new();
    let mut handles = Vec::with_capacity(CONCURRENT_CHECK_INS);
    for _ in 0..CONCURRENT_CHECK_INS {
        let request = client.post(server.url("/api/streak/check-in")).bearer_auth(token);
        handles.push(tokio::spawn(async move {
            let res = request.send().await?;
            assert_eq!(res.status(), StatusCode::OK);
            let body = res.json::<Value>().await?;
            Ok::<_, anyhow::Error>(body["data"]["transition"].as_str().unwrap_or_default().to_string())
        }));
    }

    let mut transitions = Vec::with_capacity(handles.len());
    for handle in handles {
        transitions.push(handle.await??);
    }
    Ok(transitions)
}

#[tokio::test]
async fn concurrent_check_ins_continue_yesterdays_streak_once() -> Result<()> {
    let Some(server) = common::ensure_database_server().await? else {
        return Ok(());
    };
    let (token, user_id) = common::register_user(server, "racer").await?;
    seed_streak(user_id, 1, 1, days_ago(1)).await?;

    let transitions = check_in_concurrently(server, &token).await?;

    assert_eq!(transitions.iter().filter(|t| *t == "continued").count(), 1, "{:?}", transitions);
    assert!(transitions.iter().all(|t| t == "continued" || t == "already_counted"), "{:?}", transitions);

    let streak = get_streak(server, &token).await?;
    assert_eq!(streak["current_streak"], 2);
    assert_eq!(streak["longest_streak"], 2);
    assert_eq!(streak["last_study_date"], today().to_string());
    Ok(())
}

#[tokio::test]
async fn concurrent_first_check_ins_start_at_one() -> Result<()> {
    let Some(server) = common::ensure_database_server().await? else {
        return Ok(());
    };
    let (token, _) = common::register_user(server, "newcomer").await?;

    let before = get_streak(server, &token).await?;
    assert_eq!(before["current_streak"], 0);
    assert!(before["last_study_date"].is_null());

    check_in_concurrently(server, &token).await?;

    let streak = get_streak(server, &token).await?;
    assert_eq!(streak["current_streak"], 1);
    assert_eq!(streak["longest_streak"], 1);
    assert_eq!(streak["last_study_date"], today().to_string());
    Ok(())
}

#[tokio::test]
async fn submitting_a_test_counts_as_studying_today() -> Result<()> {
    let Some(server) = common::ensure_database_server().await? else {
        return Ok(());
    };
    let (token, user_id) = common::register_user(server, "tester").await?;
    seed_streak(user_id, 4, 6, days_ago(1)).await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/tests"))
        .bearer_auth(&token)
        .json(&json!({
            "test_name": "Mock 1",
            "test_type": "mock",
            "correct_mcq": 10,
            "incorrect_mcq": 2,
            "unattempted_mcq": 3
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["result"]["total_marks"], 28);
    assert_eq!(body["data"]["streak"]["current_streak"], 5);
    assert_eq!(body["data"]["streak"]["longest_streak"], 6);
    assert_eq!(body["data"]["streak"]["transition"], "continued");

    let streak = get_streak(server, &token).await?;
    assert_eq!(streak["current_streak"], 5);
    Ok(())
}

#[tokio::test]
async fn only_same_day_sessions_touch_the_streak() -> Result<()> {
    let Some(server) = common::ensure_database_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let (token, user_id) = common::register_user(server, "logger").await?;
    seed_streak(user_id, 1, 1, days_ago(1)).await?;

    // Backfilled session: logged, streak untouched
    let res = client
        .post(server.url("/api/study-sessions"))
        .bearer_auth(&token)
        .json(&json!({"duration_minutes": 45, "study_date": days_ago(3).to_string()}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert!(body["data"]["streak"].is_null(), "body: {}", body);
    assert_eq!(body["data"]["session"]["study_date"], days_ago(3).to_string());

    let streak = get_streak(server, &token).await?;
    assert_eq!(streak["current_streak"], 1);
    assert_eq!(streak["last_study_date"], days_ago(1).to_string());

    // Session dated today: continues the streak
    let res = client
        .post(server.url("/api/study-sessions"))
        .bearer_auth(&token)
        .json(&json!({"duration_minutes": 30}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["streak"]["current_streak"], 2);
    assert_eq!(body["data"]["streak"]["transition"], "continued");

    let streak = get_streak(server, &token).await?;
    assert_eq!(streak["current_streak"], 2);
    assert_eq!(streak["longest_streak"], 2);
    Ok(())
}
