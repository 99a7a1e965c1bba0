mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_product(name: &str) -> Result<String> {
    let server = common::ensure_server().await?;
    let res = common::client()
        .post(server.url("/api/products"))
        .bearer_auth(common::admin_token())
        .json(&json!({ "name": name, "price_cents": 1999, "stock": 10 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    Ok(body["data"]["id"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn delete_returns_record_then_null() -> Result<()> {
    let server = common::ensure_server().await?;
    let id = create_product("Watercolor brushes").await?;
    let url = server.url(&format!("/api/products/{}", id));

    let first = common::client()
        .delete(&url)
        .bearer_auth(common::admin_token())
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(first["data"]["id"], id.as_str());
    assert_eq!(first["error"], Value::Null);

    let second = common::client()
        .delete(&url)
        .bearer_auth(common::admin_token())
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(second, json!({ "data": null, "error": null }));
    Ok(())
}

#[tokio::test]
async fn bulk_delete_removes_only_known_ids() -> Result<()> {
    let server = common::ensure_server().await?;
    let a = create_product("Font bundle").await?;
    let b = create_product("Texture pack").await?;

    let body = common::client()
        .delete(server.url("/api/products"))
        .bearer_auth(common::admin_token())
        .json(&json!({ "ids": [a, b, "never-existed"] }))
        .send()
        .await?
        .json::<Value>()
        .await?;

    let mut removed: Vec<String> = body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|row| row["id"].as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    removed.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(removed, expected);
    Ok(())
}

#[tokio::test]
async fn list_reflects_deletes() -> Result<()> {
    let server = common::ensure_server().await?;
    let id = create_product("Mockup kit").await?;

    let listed = common::client().get(server.url("/api/products")).send().await?.json::<Value>().await?;
    assert!(listed["data"].as_array().unwrap().iter().any(|p| p["id"] == id.as_str()));

    common::client()
        .delete(server.url(&format!("/api/products/{}", id)))
        .bearer_auth(common::admin_token())
        .send()
        .await?;

    let listed = common::client().get(server.url("/api/products")).send().await?.json::<Value>().await?;
    assert!(!listed["data"].as_array().unwrap().iter().any(|p| p["id"] == id.as_str()));
    Ok(())
}

#[tokio::test]
async fn invalid_product_is_rejected_with_messages() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .post(server.url("/api/products"))
        .bearer_auth(common::admin_token())
        .json(&json!({ "name": "Icons", "price_cents": -5, "stock": -1 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"], "Price must not be negative\nStock must not be negative");
    Ok(())
}
