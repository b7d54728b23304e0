#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{header, redirect::Policy, Client, Response};

use granite_catalog::config::AppConfig;
use granite_catalog::database::MemoryStore;
use granite_catalog::state::AppState;

pub const ADMIN_PASSWORD: &str = "integration-password";
const JWT_SECRET: &str = "integration-secret-integration-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in and return the `name=value` pair to send back as a Cookie header.
    pub async fn admin_cookie(&self) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "password": ADMIN_PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status().is_success(), "login failed: {}", res.status());
        session_cookie(&res).context("login response did not set a cookie")
    }
}

/// First `name=value` pair of the response's Set-Cookie header.
pub fn session_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/catalog.json")
}

/// Start the application on a free port, backed by the bundled fixture.
///
/// Each test gets its own server and store, living on the test's runtime.
pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let port_value = port.to_string();
    let env: HashMap<&str, &str> = HashMap::from([
        ("APP_ENV", "development"),
        ("HOST", "127.0.0.1"),
        ("PORT", port_value.as_str()),
        ("ADMIN_PASSWORD", ADMIN_PASSWORD),
        ("JWT_SECRET", JWT_SECRET),
    ]);
    let config = AppConfig::from_lookup(|key: &str| env.get(key).map(|v| v.to_string()))?;
    let bind_addr = config.server.socket_addr();

    let store = MemoryStore::load(&fixture_path()).await?;
    let app = granite_catalog::app(AppState::new(config, Arc::new(store)));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    // The gate answers with redirects that the tests need to observe.
    let client = Client::builder().redirect(Policy::none()).build()?;

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        client,
    })
}
