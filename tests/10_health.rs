mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client().get(server.url("/health")).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["database"], "in-memory");
    Ok(())
}

#[tokio::test]
async fn root_is_public() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client().get(server.url("/")).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["name"], "Storefront Admin API");
    Ok(())
}
