#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tea_api::auth::Credentials;
use tea_api::config::AppConfig;
use tea_api::database::seed::{seed, SeedOwner};
use tea_api::database::{MemoryStore, NewUser, TeaStore, User};
use tea_api::AppState;

pub const SEED_USERNAME: &str = "teaAdmin";
pub const SEED_PASSWORD: &str = "s3eded-passw0rd";

/// A server bound to a free port inside the current test runtime, backed by
/// a seeded in-memory store that the test can inspect directly.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Insert a user straight into the store, like a fixture would
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let password_hash = self.state.credentials.hash_password(password)?;
        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;
        Ok(user)
    }

    /// Log in through the API and return the bearer header value
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed with {}", res.status());

        let body = res.json::<Value>().await?;
        let token = body["token"].as_str().context("login response has no token")?;
        Ok(format!("Bearer {}", token))
    }

    /// Create a user and log in as them
    pub async fn user_with_token(&self, username: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .create_user(username, &format!("{}@example.com", username.to_lowercase()), password)
            .await?;
        let auth = self.login(username, password).await?;
        Ok((user, auth))
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    let config = AppConfig::for_tests();
    let store = Arc::new(MemoryStore::new());
    let credentials = Credentials::new(&config.security)?;
    let state = AppState::new(store.clone(), credentials);

    let owner = SeedOwner {
        username: SEED_USERNAME.to_string(),
        email: "admin@example.com".to_string(),
        password: SEED_PASSWORD.to_string(),
    };
    seed(store.as_ref(), &state.credentials, &owner).await?;

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let router = tea_api::app(state.clone(), &config);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        state,
        client: reqwest::Client::new(),
    })
}
