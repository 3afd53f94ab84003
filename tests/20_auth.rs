mod common;

use anyhow::Result;
use cat_prep_api::auth::{encode_jwt, Claims};
use cat_prep_api::types::UserRole;
use reqwest::StatusCode;

use common::{expect_error, TEST_JWT_SECRET};

#[tokio::test]
async fn protected_route_without_header_is_401() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/api/dashboard")).await?;

    expect_error(res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await?;
    Ok(())
}

#[tokio::test]
async fn admin_route_without_header_is_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/admin/modules"))
        .json(&serde_json::json!({"name": "Arithmetic"}))
        .send()
        .await?;

    expect_error(res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await?;
    Ok(())
}

#[tokio::test]
async fn malformed_authorization_header_is_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/streak"))
        .header("Authorization", "Token abc")
        .send()
        .await?;

    expect_error(res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await?;
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = encode_jwt(&Claims::with_expiry(1, UserRole::User, 1), "some-other-secret")?;

    let res = client
        .get(server.url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await?;

    expect_error(res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await?;
    Ok(())
}

#[tokio::test]
async fn expired_token_is_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        user_id: 1,
        role: UserRole::Admin,
        exp: now - 3600,
        iat: now - 7200,
    };
    let token = encode_jwt(&claims, TEST_JWT_SECRET)?;

    let res = client
        .get(server.url("/api/leaderboard"))
        .bearer_auth(token)
        .send()
        .await?;

    expect_error(res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await?;
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_json_404() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/api/does-not-exist")).await?;

    expect_error(res, StatusCode::NOT_FOUND, "NOT_FOUND").await?;
    Ok(())
}

#[tokio::test]
async fn wrong_method_is_json_405() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.delete(server.url("/api/marking/calculate")).send().await?;

    assert!(res.headers().contains_key("allow"));
    expect_error(res, StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED").await?;
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_400() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/marking/calculate"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;

    expect_error(res, StatusCode::BAD_REQUEST, "INVALID_JSON").await?;
    Ok(())
}
