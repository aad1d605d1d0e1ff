#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wishlist-api"));
        cmd.env("PRESENT_STORE", "memory")
            .env("JWT_SECRET", JWT_SECRET)
            .env("WISHLIST_API_PORT", port.to_string())
            .env("API_BIND_ADDRESS", "127.0.0.1")
            .env_remove("JWT_ISSUER")
            .env_remove("JWT_AUDIENCE")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
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

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// HS256 token for `user_id`, valid for ten minutes
pub fn token_for(user_id: &str) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();
    let claims = json!({ "sub": user_id, "iat": now, "exp": now + 600 });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
        .expect("failed to sign test token")
}

/// Fresh wishlist id so tests sharing the server never see each other's presents
pub fn unique_wishlist() -> String {
    format!("wishlist-{}", uuid::Uuid::new_v4())
}

pub async fn add_present(server: &TestServer, user: &str, body: Value) -> Result<(StatusCode, Value)> {
    let resp = reqwest::Client::new()
        .post(server.url("/api/present-commands/add"))
        .bearer_auth(token_for(user))
        .json(&body)
        .send()
        .await?;
    let status = resp.status();
    Ok((status, resp.json().await?))
}

pub async fn reserve(server: &TestServer, user: &str, body: Value) -> Result<(StatusCode, Value)> {
    let resp = reqwest::Client::new()
        .post(server.url("/api/present-commands/reserve"))
        .bearer_auth(token_for(user))
        .json(&body)
        .send()
        .await?;
    let status = resp.status();
    Ok((status, resp.json().await?))
}

pub async fn get_json(server: &TestServer, user: &str, path: &str) -> Result<(StatusCode, Value)> {
    let resp = reqwest::Client::new()
        .get(server.url(path))
        .bearer_auth(token_for(user))
        .send()
        .await?;
    let status = resp.status();
    Ok((status, resp.json().await?))
}
