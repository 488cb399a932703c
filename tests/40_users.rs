mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_then_login() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/register"))
        .json(&json!({
            "username": "newDrinker",
            "email": "drinker@example.com",
            "password": "brew-m0re-tea"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let user = res.json::<Value>().await?;
    assert_eq!(user["username"], "newDrinker");
    assert_eq!(user["email"], "drinker@example.com");
    assert!(user.get("id").is_some());
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    let res = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({ "username": "newDrinker", "password": "brew-m0re-tea" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().expect("token should be a string");
    assert_eq!(
        server.state.credentials.verify_token(token)?,
        user["id"].as_i64().expect("id should be an integer")
    );
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let server = common::spawn_server().await?;
    let payload = json!({
        "username": "twinUser",
        "email": "twin@example.com",
        "password": "tw1n-passw0rd"
    });

    let first = server.client.post(server.url("/api/register")).json(&payload).send().await?;
    assert_eq!(first.status(), StatusCode::OK);

    let second = server.client.post(server.url("/api/register")).json(&payload).send().await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // Same email, different username
    let same_email = server
        .client
        .post(server.url("/api/register"))
        .json(&json!({
            "username": "otherTwin",
            "email": "twin@example.com",
            "password": "tw1n-passw0rd"
        }))
        .send()
        .await?;
    assert_eq!(same_email.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn registration_validates_fields() -> Result<()> {
    let server = common::spawn_server().await?;

    for payload in [
        json!({ "username": "ab", "email": "ab@example.com", "password": "long-enough" }),
        json!({ "username": "validName", "email": "not-an-email", "password": "long-enough" }),
        json!({ "username": "validName", "email": "valid@example.com", "password": "short" }),
        json!({ "username": "validName", "email": "valid@example.com" }),
    ] {
        let res = server.client.post(server.url("/api/register")).json(&payload).send().await?;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "payload: {}", payload);
        assert!(res.json::<Value>().await?.get("detail").is_some());
    }
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> Result<()> {
    let server = common::spawn_server().await?;

    let wrong_password = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({ "username": common::SEED_USERNAME, "password": "guess" }))
        .send()
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let detail = wrong_password.json::<Value>().await?["detail"].clone();
    assert_eq!(detail, "Invalid username or password");

    let unknown_user = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({ "username": "ghost", "password": "whatever" }))
        .send()
        .await?;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.json::<Value>().await?["detail"], detail);
    Ok(())
}

#[tokio::test]
async fn seeded_owner_can_log_in() -> Result<()> {
    let server = common::spawn_server().await?;
    let auth = server.login(common::SEED_USERNAME, common::SEED_PASSWORD).await?;
    assert!(auth.starts_with("Bearer "));
    Ok(())
}
