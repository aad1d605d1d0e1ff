mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{add_present, get_json, unique_wishlist};

#[tokio::test]
async fn blank_keyword_returns_empty() -> Result<()> {
    let server = common::ensure_server().await?;

    for path in ["/api/present-query/search", "/api/present-query/search?keyword=", "/api/present-query/search?keyword=%20%20"] {
        let (status, body) = get_json(server, "owner", path).await?;
        assert_eq!(status, StatusCode::OK, "{}", path);
        assert_eq!(body["data"], json!([]), "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn keyword_matches_name_or_description_case_insensitively() -> Result<()> {
    let server = common::ensure_server().await?;
    let wishlist = unique_wishlist();
    let marker = uuid::Uuid::new_v4().simple().to_string();

    add_present(server, "owner", json!({"name": format!("Zeppelin {}", marker), "wishlistId": wishlist})).await?;
    add_present(
        server,
        "owner",
        json!({"name": "Model kit", "description": format!("a ZEPPELIN {}", marker), "wishlistId": wishlist}),
    )
    .await?;
    add_present(server, "owner", json!({"name": "Socks", "wishlistId": wishlist})).await?;

    let (status, body) = get_json(server, "owner", &format!("/api/present-query/search?keyword={}", marker.to_uppercase())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    Ok(())
}
