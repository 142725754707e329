use reqwest::StatusCode;
use serde_json::Value;

use crate::common::TestServer;

fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_login_listing_excludes_disabled_and_link() {
    let server = TestServer::start().await;

    let response = server.get("/api/auth-providers/login").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();

    assert_eq!(names(&body), vec!["fake", "fake-api", "ldap"]);
    let ldap = &body.as_array().unwrap()[2];
    assert_eq!(ldap["authMethod"], "POST");
    assert_eq!(ldap["authBodyFormat"], "urlencoded");
    assert_eq!(ldap["authPath"], "/auth/ldap/login");

    server.shutdown();
}

#[tokio::test]
async fn test_login_listing_with_disabled() {
    let server = TestServer::start().await;

    let response = server
        .get("/api/auth-providers/login?includeDisabled=true")
        .await;
    let body: Value = response.json().await.unwrap();

    assert_eq!(names(&body), vec!["fake", "fake-api", "ldap", "retired"]);
    assert_eq!(body.as_array().unwrap()[3]["disabled"], true);

    server.shutdown();
}

#[tokio::test]
async fn test_link_listing() {
    let server = TestServer::start().await;

    let response = server.get("/api/auth-providers/link").await;
    let body: Value = response.json().await.unwrap();

    assert_eq!(names(&body), vec!["fake-link"]);
    assert_eq!(body[0]["link"], true);

    server.shutdown();
}

#[tokio::test]
async fn test_disabled_provider_has_no_routes() {
    let server = TestServer::start().await;

    let response = server.get("/auth/retired/login").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.shutdown();
}
