mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use tea_api::database::TeaStore;

#[tokio::test]
async fn comment_on_tea_shows_up_everywhere() -> Result<()> {
    let server = common::spawn_server().await?;
    let (_, auth) = server.user_with_token("commenter", "c0mment-pass").await?;
    let tea_id = server.store.list_teas().await?[0].id;

    let res = server
        .client
        .post(server.url(&format!("/api/teas/{}/comments", tea_id)))
        .header("Authorization", &auth)
        .json(&json!({ "content": "Perfect with milk" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let comment = res.json::<Value>().await?;
    assert_eq!(comment["content"], "Perfect with milk");
    let comment_id = comment["id"].as_i64().expect("id should be an integer");

    let tea = server
        .client
        .get(server.url(&format!("/api/teas/{}", tea_id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(tea["comments"], json!([{ "id": comment_id, "content": "Perfect with milk" }]));

    let list = server.client.get(server.url("/api/comments")).send().await?;
    assert_eq!(list.status(), StatusCode::OK);
    assert_eq!(list.json::<Value>().await?.as_array().map(|a| a.len()), Some(1));

    let single = server
        .client
        .get(server.url(&format!("/api/comments/{}", comment_id)))
        .send()
        .await?;
    assert_eq!(single.status(), StatusCode::OK);
    assert_eq!(single.json::<Value>().await?["content"], "Perfect with milk");
    Ok(())
}

#[tokio::test]
async fn missing_comment_and_missing_tea() -> Result<()> {
    let server = common::spawn_server().await?;
    let (_, auth) = server.user_with_token("commenter", "c0mment-pass").await?;

    let res = server.client.get(server.url("/api/comments/4242")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["detail"], "Comment not found");

    let res = server
        .client
        .post(server.url("/api/teas/4242/comments"))
        .header("Authorization", &auth)
        .json(&json!({ "content": "Into the void" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["detail"], "Tea not found");
    Ok(())
}

#[tokio::test]
async fn commenting_requires_a_token_and_content() -> Result<()> {
    let server = common::spawn_server().await?;
    let tea_id = server.store.list_teas().await?[0].id;

    let anonymous = server
        .client
        .post(server.url(&format!("/api/teas/{}/comments", tea_id)))
        .json(&json!({ "content": "Who am I" }))
        .send()
        .await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let (_, auth) = server.user_with_token("commenter", "c0mment-pass").await?;
    let empty = server
        .client
        .post(server.url(&format!("/api/teas/{}/comments", tea_id)))
        .header("Authorization", &auth)
        .json(&json!({ "content": "" }))
        .send()
        .await?;
    assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert!(server.store.list_comments().await?.is_empty());
    Ok(())
}
