mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn admin_manages_orders() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();
    let token = common::admin_token();

    let created = client
        .post(server.url("/admin/orders"))
        .bearer_auth(&token)
        .json(&json!({ "user_id": "user-7", "total_cents": 2500 }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(created["data"]["status"], "pending");
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = client
        .patch(server.url(&format!("/admin/orders/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "status": "paid" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["status"], "paid");

    let shown = client
        .get(server.url(&format!("/admin/orders/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(shown.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_user_role_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .post(server.url("/admin/users"))
        .bearer_auth(common::admin_token())
        .json(&json!({ "email": "editor@example.com", "role": "editor" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json::<Value>().await?["error"], "Role must be either admin or user");
    Ok(())
}

#[tokio::test]
async fn duplicate_setting_key_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();
    let token = common::admin_token();
    let body = json!({ "key": "duplicate-check", "value": "on" });

    let first = client
        .post(server.url("/admin/settings"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await?;
    assert_eq!(first.status(), StatusCode::OK);

    let second = client
        .post(server.url("/admin/settings"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await?;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let envelope = second.json::<Value>().await?;
    assert_eq!(envelope["data"], Value::Null);
    assert!(envelope["error"].as_str().unwrap_or_default().contains("settings.key"));
    Ok(())
}

#[tokio::test]
async fn missing_record_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .get(server.url("/admin/settings/ghost"))
        .bearer_auth(common::admin_token())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
