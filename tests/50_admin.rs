mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::json;
use sqlx::{Connection, PgConnection};

use common::expect_error;

async fn promote_to_admin(user_id: i64) -> Result<()> {
    let url = common::test_database_url().context("database url missing")?;
    let mut conn = PgConnection::connect(&url).await?;
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(user_id)
        .execute(&mut conn)
        .await?;
    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn regular_user_cannot_add_content() -> Result<()> {
    let Some(server) = common::ensure_database_server().await? else {
        return Ok(());
    };
    let (token, _) = common::register_user(server, "learner").await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/admin/modules"))
        .bearer_auth(&token)
        .json(&json!({"name": "Quantitative Aptitude"}))
        .send()
        .await?;

    expect_error(res, StatusCode::FORBIDDEN, "FORBIDDEN").await?;
    Ok(())
}

#[tokio::test]
async fn item_for_missing_material_is_404() -> Result<()> {
    let Some(server) = common::ensure_database_server().await? else {
        return Ok(());
    };
    let (token, user_id) = common::register_user(server, "editor").await?;
    promote_to_admin(user_id).await?;

    let res = reqwest::Client::new()
        .post(server.url(&format!("/api/admin/materials/{}/pointers", i64::MAX)))
        .bearer_auth(&token)
        .json(&json!({"content": "Percent change is relative to the original value"}))
        .send()
        .await?;

    expect_error(res, StatusCode::NOT_FOUND, "NOT_FOUND").await?;
    Ok(())
}
