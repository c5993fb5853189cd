use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    _child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/kotha-api");
        cmd.env("PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL and
        // ACCESS_TOKEN_SECRET from .env (loaded by the server itself)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, _child: child })
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
                // The store may be absent; the server is up either way
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Obtain a session cookie value via POST /jwt, bypassing the client-side
/// cookie jar (the cookie is Secure, so jars refuse to replay it over the
/// plain-http test transport).
pub async fn session_token_for(server: &TestServer, email: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/jwt", server.base_url))
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "jwt issuance failed: {}", res.status());

    let set_cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .context("missing Set-Cookie header")?
        .to_str()?
        .to_string();

    let token = set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("token="))
        .context("missing token cookie in Set-Cookie")?
        .to_string();
    anyhow::ensure!(!token.is_empty(), "empty token cookie");
    Ok(token)
}
