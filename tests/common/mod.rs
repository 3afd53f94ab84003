use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;

/// Secret the spawned server signs and verifies tokens with
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Points the database-backed tests at a disposable Postgres database
pub const TEST_DATABASE_URL_VAR: &str = "CATPREP_TEST_DATABASE_URL";

/// Nothing listens on port 1, so every database call fails fast
const DEAD_DATABASE_URL: &str = "postgres://catprep@127.0.0.1:1/cat_prep";

static SERVER: OnceLock<TestServer> = OnceLock::new();
static DATABASE_SERVER: OnceLock<TestServer> = OnceLock::new();

#[allow(dead_code)]
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(database_url: &str, migrate: bool) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cat-prep-api"));
        if migrate {
            cmd.arg("--migrate");
        }
        cmd.env("APP_ENV", "development")
            .env("CATPREP_API_HOST", "127.0.0.1")
            .env("CATPREP_API_PORT", port.to_string())
            .env("JWT_SECRET", TEST_JWT_SECRET)
            .env("DATABASE_URL", database_url)
            .env("DATABASE_CONNECT_TIMEOUT_SECS", "2")
            .env("RUST_LOG", "cat_prep_api=warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Server with an unreachable database; covers behavior that happens before any query
#[allow(dead_code)]
pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn(DEAD_DATABASE_URL, false).expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Server with migrations applied to the database named by
/// `CATPREP_TEST_DATABASE_URL`. `None` when the variable is unset.
#[allow(dead_code)]
pub async fn ensure_database_server() -> Result<Option<&'static TestServer>> {
    let Some(url) = test_database_url() else {
        eprintln!("{} not set; skipping database-backed test", TEST_DATABASE_URL_VAR);
        return Ok(None);
    };
    let server = DATABASE_SERVER.get_or_init(|| TestServer::spawn(&url, true).expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(30)).await?;
    Ok(Some(server))
}

#[allow(dead_code)]
pub fn test_database_url() -> Option<String> {
    std::env::var(TEST_DATABASE_URL_VAR).ok().filter(|url| !url.trim().is_empty())
}

/// Read a response body and check it uses the failure envelope
#[allow(dead_code)]
pub async fn expect_error(resp: reqwest::Response, status: StatusCode, code: &str) -> Result<serde_json::Value> {
    assert_eq!(resp.status(), status);
    let body = resp.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false, "body: {}", body);
    assert_eq!(body["code"], code, "body: {}", body);
    assert!(body["error"].is_string(), "body: {}", body);
    Ok(body)
}

/// Register a fresh account and return its token and user id
#[allow(dead_code)]
pub async fn register_user(server: &TestServer, label: &str) -> Result<(String, i64)> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let email = format!("{}-{}-{}@catprep.test", label, std::process::id(), nanos);

    let res = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .json(&serde_json::json!({"name": label, "email": email, "password": "test-pass-123"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<serde_json::Value>().await?;
    let token = body["data"]["token"].as_str().context("token missing")?.to_string();
    let user_id = body["data"]["user"]["id"].as_i64().context("user id missing")?;
    Ok((token, user_id))
}
